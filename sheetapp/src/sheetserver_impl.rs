//! Implémentation de [`WebAppExt`](crate::WebAppExt) pour `sheetserver::Server`

use crate::WebAppExt;
use rust_embed::RustEmbed;
use sheetserver::Server;

#[async_trait::async_trait]
impl WebAppExt for Server {
    async fn add_webapp<W>(&mut self, path: &str)
    where
        W: RustEmbed + Clone + Send + Sync + 'static,
    {
        let mount_path = normalize_mount_path(path);
        self.add_spa::<W>(&mount_path).await;

        if mount_path != "/" {
            let trailing = format!("{}/", mount_path);
            self.add_redirect(&trailing, &mount_path).await;
        }
    }
}

/// `" app/ "` devient `"/app"`, `""` et `"/"` restent `"/"`
fn normalize_mount_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
