// src/common/messages.rs

// Mensagens voltadas ao fornecedor, já localizadas no servidor.
// O portal mostra o texto tal como chega; pt é o idioma padrão,
// en cobre fornecedores internacionais via Accept-Language.

pub fn token_not_found(lang: &str) -> String {
    match lang {
        "en" => "invalid token or assistance not found".to_string(),
        _ => "token inválido ou assistência não encontrada".to_string(),
    }
}

pub fn action_done(lang: &str, action: &str) -> String {
    match lang {
        "en" => format!("Action '{}' completed successfully.", action),
        _ => format!("Ação '{}' realizada com sucesso.", action),
    }
}
