use std::sync::Arc;

use chrono::Duration;

use crate::application::ports::business_repository::BusinessRepository;
use crate::application::ports::cart_repository::CartRepository;
use crate::application::ports::company_registry::CompanyRegistry;
use crate::application::ports::file_store::FileStore;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::payment_gateway::PaymentGateway;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::jwt::{JwtService, TokenLifetimes};
use crate::application::use_cases::orders::PaymentSettings;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
    jwt: Arc<JwtService>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    business_repo: Arc<dyn BusinessRepository>,
    product_repo: Arc<dyn ProductRepository>,
    cart_repo: Arc<dyn CartRepository>,
    order_repo: Arc<dyn OrderRepository>,
    mailer: Arc<dyn Mailer>,
    file_store: Arc<dyn FileStore>,
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
    company_registry: Option<Arc<dyn CompanyRegistry>>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        business_repo: Arc<dyn BusinessRepository>,
        product_repo: Arc<dyn ProductRepository>,
        cart_repo: Arc<dyn CartRepository>,
        order_repo: Arc<dyn OrderRepository>,
        mailer: Arc<dyn Mailer>,
        file_store: Arc<dyn FileStore>,
        payment_gateway: Option<Arc<dyn PaymentGateway>>,
        company_registry: Option<Arc<dyn CompanyRegistry>>,
    ) -> Self {
        Self {
            user_repo,
            business_repo,
            product_repo,
            cart_repo,
            order_repo,
            mailer,
            file_store,
            payment_gateway,
            company_registry,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        let lifetimes = TokenLifetimes {
            access: Duration::minutes(cfg.access_token_ttl_minutes),
            refresh: Duration::hours(cfg.refresh_token_ttl_hours),
            password_reset: Duration::minutes(cfg.password_reset_token_ttl_minutes),
        };
        let jwt = JwtService::new(&cfg.jwt_secret, &cfg.jwt_issuer, lifetimes);
        Self {
            cfg,
            services: Arc::new(services),
            jwt: Arc::new(jwt),
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn verification_code_ttl(&self) -> Duration {
        Duration::minutes(self.cfg.verification_code_ttl_minutes)
    }

    /// Base of links sent in emails.
    pub fn frontend_url(&self) -> &str {
        self.cfg.frontend_url.as_deref().unwrap_or("")
    }

    pub fn payment_settings(&self) -> PaymentSettings {
        PaymentSettings {
            return_url: self.cfg.payment_return_url.clone(),
            currency: self.cfg.payment_currency.clone(),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn business_repo(&self) -> Arc<dyn BusinessRepository> {
        self.services.business_repo.clone()
    }

    pub fn product_repo(&self) -> Arc<dyn ProductRepository> {
        self.services.product_repo.clone()
    }

    pub fn cart_repo(&self) -> Arc<dyn CartRepository> {
        self.services.cart_repo.clone()
    }

    pub fn order_repo(&self) -> Arc<dyn OrderRepository> {
        self.services.order_repo.clone()
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        self.services.mailer.clone()
    }

    pub fn file_store(&self) -> Arc<dyn FileStore> {
        self.services.file_store.clone()
    }

    pub fn payment_gateway(&self) -> Option<Arc<dyn PaymentGateway>> {
        self.services.payment_gateway.clone()
    }

    pub fn company_registry(&self) -> Option<Arc<dyn CompanyRegistry>> {
        self.services.company_registry.clone()
    }
}
