use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    bookings::BookingRepo,
    config::AppConfig,
    content::LandingRepo,
    db::{self, PgStore},
    genai::{ContentGenerator, GeminiClient},
    meal_plans::MealPlanRepo,
    onboarding::OnboardingRepo,
    plan::PlanRepo,
    points::{AccountRepo, FcmNotifier, FlutterwaveGateway, Notifier, PaymentGateway},
    profile::ProfileRepo,
    tracking::TrackingRepo,
};

/// Everything a store must provide. Implemented by [`PgStore`] and by the
/// in-memory store used in tests.
pub trait Store:
    OnboardingRepo
    + ProfileRepo
    + PlanRepo
    + MealPlanRepo
    + AccountRepo
    + BookingRepo
    + LandingRepo
    + TrackingRepo
    + 'static
{
}

impl<T> Store for T where
    T: OnboardingRepo
        + ProfileRepo
        + PlanRepo
        + MealPlanRepo
        + AccountRepo
        + BookingRepo
        + LandingRepo
        + TrackingRepo
        + 'static
{
}

#[derive(Clone)]
pub struct AppState {
    /// Direct pool access for auth and migrations.
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub onboarding: Arc<dyn OnboardingRepo>,
    pub profiles: Arc<dyn ProfileRepo>,
    pub plans: Arc<dyn PlanRepo>,
    pub meal_plans: Arc<dyn MealPlanRepo>,
    pub accounts: Arc<dyn AccountRepo>,
    pub bookings: Arc<dyn BookingRepo>,
    pub landings: Arc<dyn LandingRepo>,
    pub tracking: Arc<dyn TrackingRepo>,
    pub generator: Arc<dyn ContentGenerator>,
    pub payments: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;

        let store = Arc::new(PgStore::new(db.clone()));
        let generator = Arc::new(GeminiClient::new(&config.genai)?) as Arc<dyn ContentGenerator>;
        let payments =
            Arc::new(FlutterwaveGateway::new(&config.payments)?) as Arc<dyn PaymentGateway>;
        let notifier = Arc::new(FcmNotifier::new(&config.notifications)?) as Arc<dyn Notifier>;

        Ok(Self::from_parts(db, config, store, generator, payments, notifier))
    }

    pub fn from_parts<S: Store>(
        db: PgPool,
        config: Arc<AppConfig>,
        store: Arc<S>,
        generator: Arc<dyn ContentGenerator>,
        payments: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            config,
            onboarding: store.clone(),
            profiles: store.clone(),
            plans: store.clone(),
            meal_plans: store.clone(),
            accounts: store.clone(),
            bookings: store.clone(),
            landings: store.clone(),
            tracking: store,
            generator,
            payments,
            notifier,
        }
    }
}
