use fast_service::{FastApi, ignore_route, tags};

#[tags("Catalog")]
#[derive(Default, FastApi)]
pub struct CatalogService;

impl CatalogService {
    #[ignore_route]
    pub fn warm_up(&self) {}
}
