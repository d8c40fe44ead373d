pub mod account_service;
pub use account_service::{AccountError, AccountService, LoginResult, NewAccount, RegisteredUser};

pub mod account_service_impl;
pub use account_service_impl::SeaOrmAccountService;

pub mod catalog_service;
pub use catalog_service::{CatalogError, CatalogService, ItemDto};

pub mod catalog_service_impl;
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod content_store;
pub use content_store::ContentStore;

pub mod mailer;
pub use mailer::{LogMailer, MailError, Mailer, SmtpMailer};

pub mod otp;
