pub mod auth;
pub mod comissao_service;
pub mod policy;
pub mod proposta_service;
pub mod resolver;
pub mod user_service;
