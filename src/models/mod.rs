pub mod complaint;
pub mod dashboard;
pub mod feedback;
pub mod report;
pub mod revoked_token;
pub mod staff;
pub mod status;
pub mod supervisor;
pub mod timeline;
pub mod user;
