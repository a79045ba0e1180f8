pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod comissao_repo;
pub use comissao_repo::{ComissaoRepository, PgComissaoRepository};
pub mod proposta_repo;
pub use proposta_repo::{PgPropostaRepository, PropostaRepository};

#[cfg(test)]
pub mod memory;
