use fast_service::{FastApi, filter, get, ignore_route, route, tags};

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    pub item: String,
}

#[route("/orders")]
#[tags("Orders")]
#[filter(super::RequireAuth)]
#[derive(Default, FastApi)]
pub struct OrderService;

impl OrderService {
    pub async fn get_by_id(&self, id: u64) -> Option<Order> {
        (id == 1).then(|| Order {
            id,
            item: "book".to_string(),
        })
    }

    pub async fn get_all(&self) -> Vec<Order> {
        Vec::new()
    }

    pub async fn create(&self, order: Order) -> u64 {
        order.id
    }

    #[filter(AuditLog)]
    pub async fn remove(&self, id: u64) -> bool {
        id == 1
    }

    #[get("/recent/{count}")]
    pub fn recent(&self, count: u32) -> Vec<u64> {
        (0..u64::from(count)).collect()
    }

    #[ignore_route]
    #[get("/internal")]
    pub fn get_internal(&self) -> String {
        "internal".to_string()
    }

    #[ignore_route]
    pub fn cache_key(&self, id: u64) -> String {
        format!("order:{id}")
    }

    fn audit(&self) {}
}
