use crate::blotato::BlotatoClient;
use crate::content::ContentGenerator;
use crate::facebook::FacebookClient;

/// Shared state for the social API service.
#[derive(Clone)]
pub struct AppState {
    pub facebook: FacebookClient,
    pub blotato: BlotatoClient,
    pub generator: ContentGenerator,
    pub pool: mp_api_lib::db::Pool,
}

impl AppState {
    pub fn new(
        facebook: FacebookClient,
        blotato: BlotatoClient,
        generator: ContentGenerator,
        pool: mp_api_lib::db::Pool,
    ) -> Self {
        Self {
            facebook,
            blotato,
            generator,
            pool,
        }
    }
}
