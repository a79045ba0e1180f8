// src/common/money.rs

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::common::error::AppError;

/// Dígitos, com ponto e uma ou duas casas opcionais (ex: 1500.50).
pub static MONEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("padrão monetário inválido"));

// Maior valor que cabe em NUMERIC(15,2)
pub const MAX_VALOR: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

fn out_of_range(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    err
}

// O formato é conferido pelo `regex`; aqui só o teto.
fn check_max(value: &str, max: Decimal, message: &'static str) -> Result<(), ValidationError> {
    if !MONEY_RE.is_match(value) {
        return Ok(());
    }
    match Decimal::from_str(value) {
        Ok(v) if v <= max => Ok(()),
        _ => Err(out_of_range(message)),
    }
}

pub fn validate_valor(value: &str) -> Result<(), ValidationError> {
    check_max(value, MAX_VALOR, "valor_out_of_range")
}

pub fn validate_percentual(value: &str) -> Result<(), ValidationError> {
    check_max(value, Decimal::ONE_HUNDRED, "percentual_out_of_range")
}

/// Converte uma string já validada em `Decimal` com escala 2, como no banco.
pub fn parse_money(value: &str) -> Result<Decimal, AppError> {
    let mut parsed = Decimal::from_str(value)
        .map_err(|e| AppError::InvalidBody(format!("valor monetário inválido '{}': {}", value, e)))?;
    parsed.rescale(2);
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_accepts_plain_and_two_decimal_amounts() {
        for ok in ["0", "10000", "10000.5", "10000.00", "2.50"] {
            assert!(MONEY_RE.is_match(ok), "{ok} deveria ser aceito");
        }
        for bad in ["", ".5", "10.", "10.123", "-1", "1,50", "1e3", " 10", "abc"] {
            assert!(!MONEY_RE.is_match(bad), "{bad} deveria ser rejeitado");
        }
    }

    #[test]
    fn valor_is_capped_at_numeric_15_2() {
        assert_eq!(MAX_VALOR.to_string(), "9999999999999.99");
        assert!(validate_valor("9999999999999.99").is_ok());
        assert!(validate_valor("10000000000000").is_err());
        assert!(validate_valor(&"9".repeat(28)).is_err());
        assert!(validate_valor(&"9".repeat(40)).is_err());
        // Formato inválido é reportado pelo regex, não pelo teto
        assert!(validate_valor("1,50").is_ok());
    }

    #[test]
    fn percentual_is_capped_at_one_hundred() {
        assert!(validate_percentual("100.00").is_ok());
        assert!(validate_percentual("2.5").is_ok());
        assert!(validate_percentual("100.01").is_err());
    }

    #[test]
    fn parse_fixes_scale_at_two() {
        assert_eq!(parse_money("250.00").unwrap().to_string(), "250.00");
        assert_eq!(parse_money("10000.5").unwrap().to_string(), "10000.50");
        assert_eq!(parse_money("7").unwrap().to_string(), "7.00");
    }
}
