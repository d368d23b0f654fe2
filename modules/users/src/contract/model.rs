/// Credentials handed over by a social identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSocial {
    /// ID token issued by Google.
    pub token_id: String,
}
