// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

// Idioma usado quando o cliente não pede nenhum que conheçamos
pub const DEFAULT_LANG: &str = "pt";

// (chave, pt, en)
const CATALOG: &[(&str, &str, &str)] = &[
    // --- Autenticação / autorização ---
    ("unauthorized", "Sessão inválida ou ausente.", "Missing or invalid session."),
    ("forbidden", "Você não tem permissão para realizar esta ação.", "You are not allowed to perform this action."),
    ("invalid_credentials", "Usuário ou senha inválidos.", "Invalid credentials."),

    // --- Recursos ---
    ("user_not_found", "Usuário não encontrado.", "User not found."),
    ("proposta_not_found", "Proposta não encontrada.", "Proposal not found."),
    ("comissao_not_found", "Comissão não encontrada.", "Commission rate not found."),
    ("unknown_procedure", "Procedimento desconhecido.", "Unknown procedure."),
    ("method_not_supported", "Método não suportado para este procedimento.", "Method not supported for this procedure."),

    // --- Conflitos ---
    ("duplicate_username", "Este nome de usuário já está em uso.", "Username already exists."),
    ("duplicate_comissao", "Já existe uma comissão ativa para este usuário, banco e tipo.", "An active commission rate already exists for this user, bank and type."),
    ("user_has_dependents", "O usuário possui propostas ou comissões vinculadas.", "The user still owns proposals or commission rates."),

    // --- Validação ---
    ("validation_failed", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("invalid_body", "Corpo da requisição inválido.", "Invalid request body."),
    ("required", "Campo obrigatório.", "This field is required."),
    ("invalid_money", "Use apenas dígitos, com até duas casas decimais (ex: 1500.50).", "Use digits only, with up to two decimal places (e.g. 1500.50)."),
    ("valor_out_of_range", "O valor deve ser no máximo 9999999999999.99.", "The amount must be at most 9999999999999.99."),
    ("percentual_out_of_range", "O percentual deve estar entre 0 e 100.", "The percentage must be between 0 and 100."),
    ("invalid_parcelas", "O número de parcelas deve ser um inteiro positivo.", "The installment count must be a positive integer."),
    ("invalid_email", "O e-mail fornecido é inválido.", "Invalid e-mail address."),
    ("password_too_short", "A senha deve ter no mínimo 6 caracteres.", "Password must be at least 6 characters long."),
    ("invalid_username", "O usuário deve ter entre 3 e 100 caracteres.", "Username must be between 3 and 100 characters."),
    ("invalid_length", "Deve ter entre 1 e 100 caracteres.", "Must be between 1 and 100 characters long."),

    // --- Genérico ---
    ("internal_error", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Catálogo de mensagens por idioma, compartilhado via `AppState`.
#[derive(Clone)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut pt_messages = HashMap::with_capacity(CATALOG.len());
        let mut en_messages = HashMap::with_capacity(CATALOG.len());
        for (key, pt, en) in CATALOG {
            pt_messages.insert(*key, *pt);
            en_messages.insert(*key, *en);
        }
        let messages = HashMap::from([("pt", pt_messages), ("en", en_messages)]);
        Self { messages: Arc::new(messages) }
    }

    /// Traduz uma chave. Cai para o português e, por fim, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        let lookup = |lang: &str| self.messages.get(lang).and_then(|m| m.get(key)).copied();
        lookup(lang)
            .or_else(|| lookup(DEFAULT_LANG))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_keys_per_language() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "forbidden"), "You are not allowed to perform this action.");
        assert_eq!(store.translate("pt", "invalid_credentials"), "Usuário ou senha inválidos.");
    }

    #[test]
    fn falls_back_to_portuguese_then_to_the_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "required"), "Campo obrigatório.");
        assert_eq!(store.translate("en", "no_such_key"), "no_such_key");
    }
}
