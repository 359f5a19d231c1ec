// src/services/token.rs

use rand::{Rng, distributions::Alphanumeric, thread_rng};

use crate::common::error::AppError;

/// Comprimento mínimo aceite na fronteira. Qualquer coisa mais curta é
/// rejeitada antes de tocar no banco, o que limita o custo de lookups
/// desperdiçados e corta tentativas triviais de injeção.
pub const MIN_TOKEN_LEN: usize = 40;

/// Comprimento dos tokens que nós próprios emitimos.
pub const ISSUED_TOKEN_LEN: usize = 48;

/// Cada coluna de token legitima exatamente uma classe de transição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    Acceptance,
    Scheduling,
    Validation,
}

impl TokenScope {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Acceptance => "acceptance_token",
            Self::Scheduling => "scheduling_token",
            Self::Validation => "validation_token",
        }
    }
}

/// Verificação puramente sintática, sem qualquer chamada ao backend:
/// pelo menos 40 caracteres, todos em [A-Za-z0-9-]. Distingue token em
/// falta de token malformado porque a auditoria regista códigos distintos.
pub fn validate_syntax(token: Option<&str>) -> Result<&str, AppError> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Err(AppError::MissingToken),
    };

    if token.len() < MIN_TOKEN_LEN {
        return Err(AppError::InvalidTokenFormat);
    }

    if !token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(AppError::InvalidTokenFormat);
    }

    Ok(token)
}

/// Emite um novo token de capacidade: 48 caracteres alfanuméricos de alta
/// entropia, dentro do charset do contrato.
pub fn mint_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ISSUED_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_tokens_are_distinct_from_malformed() {
        assert!(matches!(validate_syntax(None), Err(AppError::MissingToken)));
        assert!(matches!(validate_syntax(Some("")), Err(AppError::MissingToken)));
        assert!(matches!(
            validate_syntax(Some("curto")),
            Err(AppError::InvalidTokenFormat)
        ));
    }

    #[test]
    fn rejects_out_of_charset_input() {
        let bad = "a".repeat(39) + "!'; DROP TABLE assistances;--";
        assert!(matches!(
            validate_syntax(Some(&bad)),
            Err(AppError::InvalidTokenFormat)
        ));

        let with_space = format!("{} {}", "a".repeat(25), "b".repeat(25));
        assert!(matches!(
            validate_syntax(Some(&with_space)),
            Err(AppError::InvalidTokenFormat)
        ));
    }

    #[test]
    fn accepts_tokens_at_and_above_the_minimum() {
        let exact = "A1-".repeat(14); // 42 chars
        assert!(validate_syntax(Some(&exact)).is_ok());

        let too_short = "a".repeat(MIN_TOKEN_LEN - 1);
        assert!(validate_syntax(Some(&too_short)).is_err());
    }

    #[test]
    fn minted_tokens_satisfy_the_contract() {
        for _ in 0..16 {
            let token = mint_token();
            assert_eq!(token.len(), ISSUED_TOKEN_LEN);
            assert!(validate_syntax(Some(&token)).is_ok());
        }
    }

    #[test]
    fn minted_tokens_are_unique_in_practice() {
        let a = mint_token();
        let b = mint_token();
        assert_ne!(a, b);
    }
}
