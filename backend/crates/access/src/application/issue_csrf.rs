//! Issue CSRF Token Use Case

use platform::csrf::CsrfTokenService;

/// Issue CSRF Token Use Case
pub struct IssueCsrfTokenUseCase {
    csrf: CsrfTokenService,
}

impl IssueCsrfTokenUseCase {
    pub fn new(csrf: CsrfTokenService) -> Self {
        Self { csrf }
    }

    pub fn execute(&self) -> String {
        let token = self.csrf.issue();
        tracing::debug!("Issued CSRF token");
        token
    }
}
