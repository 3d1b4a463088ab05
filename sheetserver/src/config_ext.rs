//! Extension pour intégrer l'API de configuration de sheetconfig dans sheetserver

use crate::Server;
use sheetconfig::{api, get_config, ApiDoc};
use utoipa::OpenApi;

/// Trait d'extension pour ajouter l'API de configuration au serveur
///
/// # Routes enregistrées
///
/// - `GET /api/config` - Récupérer toute la configuration
/// - `GET /api/config/{path}` - Récupérer une valeur (ex: host.http_port)
/// - `POST /api/config` - Mettre à jour une valeur
/// - `GET /swagger-ui/config` - Documentation interactive Swagger
#[allow(async_fn_in_trait)]
pub trait ConfigExt {
    async fn init_config_api(&mut self);
}

impl ConfigExt for Server {
    async fn init_config_api(&mut self) {
        let api_router = api::create_router(get_config());
        self.add_openapi(api_router, ApiDoc::openapi(), "config").await;
    }
}
