pub mod naver;
pub mod price_provider;
