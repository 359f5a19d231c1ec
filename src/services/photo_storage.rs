// src/services/photo_storage.rs

use async_trait::async_trait;
use std::path::PathBuf;

use crate::common::error::AppError;

/// Resultado da gravação de um blob: onde ficou e como o frontend o vê.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub storage_path: String,
    pub public_url: String,
}

/// Colaborador de armazenamento de fotos. O contrato é só este: guardar
/// o blob e devolver um URL público; os metadados ficam na tabela photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoredBlob, AppError>;
}

/// Implementação em disco local servida por um CDN/nginx à frente.
pub struct LocalPhotoStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalPhotoStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoredBlob, AppError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar diretório de uploads: {}", e))?;

        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar foto {}: {}", path.display(), e))?;

        Ok(StoredBlob {
            storage_path: path.to_string_lossy().into_owned(),
            public_url: format!("{}/{}", self.public_base.trim_end_matches('/'), file_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_bytes_and_builds_public_url() {
        let dir = std::env::temp_dir().join("assistencias-photo-storage-test");
        let storage = LocalPhotoStorage::new(&dir, "https://cdn.example.com/fotos/");

        let blob = storage.store("teste.jpg", b"jpegdata").await.unwrap();
        assert_eq!(blob.public_url, "https://cdn.example.com/fotos/teste.jpg");

        let on_disk = tokio::fs::read(dir.join("teste.jpg")).await.unwrap();
        assert_eq!(on_disk, b"jpegdata");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
