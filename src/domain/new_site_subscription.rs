use super::{ContactEmail, PlanName, Subdomain};

#[derive(Debug)]
pub struct NewSiteSubscription {
    pub subdomain: Subdomain,
    pub plan: PlanName,
    pub email: ContactEmail,
}

impl NewSiteSubscription {
    pub fn parse(subdomain: String, plan: String, email: String) -> Result<Self, String> {
        Ok(Self {
            subdomain: Subdomain::parse(subdomain)?,
            plan: PlanName::parse(plan)?,
            email: ContactEmail::parse(email)?,
        })
    }
}
