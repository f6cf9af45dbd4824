use fast_service::FastApi;

#[derive(Default, FastApi)]
pub struct HealthService {
    pings: u32,
}

impl HealthService {
    pub fn get_status(&self) -> String {
        "ok".to_string()
    }

    pub fn ping(&mut self) -> String {
        self.pings += 1;
        format!("pong {}", self.pings)
    }

    #[cfg(not(test))]
    pub fn get_uptime(&self) -> u64 {
        0
    }

    #[cfg(test)]
    pub fn get_fixture(&self) -> String {
        "fixture".to_string()
    }
}
