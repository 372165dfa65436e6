pub mod provider;

pub use provider::HttpIdentityProvider;
pub use provider::ProviderKind;
