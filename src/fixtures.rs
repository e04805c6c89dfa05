// Fixed inputs of the smoke run. Nothing here is read from the
// environment: the run always targets the local service with the same
// user, order and withdrawal.

use crate::api::{Credentials, WithdrawRequest};

pub const BASE_URL: &str = "http://localhost:8080";
pub const LOGIN: &str = "test";
pub const PASSWORD: &str = "1";
pub const ORDER_NUMBER: &str = "55875248746";
pub const WITHDRAW_ORDER: &str = "2377225624";
pub const WITHDRAW_SUM: f64 = 100.1;

/// Everything the driver sends, bundled so it can be handed to
/// `driver::run` explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub credentials: Credentials,
    pub order_number: String,
    pub withdrawal: WithdrawRequest,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            credentials: Credentials {
                login: LOGIN.into(),
                password: PASSWORD.into(),
            },
            order_number: ORDER_NUMBER.into(),
            withdrawal: WithdrawRequest {
                order: WITHDRAW_ORDER.into(),
                sum: WITHDRAW_SUM,
            },
        }
    }
}
