//! `Authorizer` backed by the configured admin list.

use crate::application::ports::Authorizer;
use crate::domain::config::is_authorized;

pub struct AdminList {
    admins: Vec<String>,
}

impl AdminList {
    #[must_use]
    pub fn new(admins: &[String]) -> Self {
        Self {
            admins: admins.to_vec(),
        }
    }
}

impl Authorizer for AdminList {
    fn is_authorized(&self, sender: Option<&str>) -> bool {
        is_authorized(&self.admins, sender)
    }
}
