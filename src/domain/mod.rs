mod admin_password;
mod contact_email;
mod new_site_subscription;
mod plan_name;
mod site_name;
mod site_status;
mod site_subscription;
mod subdomain;

pub use admin_password::AdminPassword;
pub use contact_email::ContactEmail;
pub use new_site_subscription::NewSiteSubscription;
pub use plan_name::PlanName;
pub use site_name::SiteName;
pub use site_status::SiteStatus;
pub use site_subscription::SiteSubscription;
pub use subdomain::Subdomain;
