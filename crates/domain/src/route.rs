//! Storefront routes and access guards.
//!
//! The guard mirrors what every protected page does before rendering:
//! wait while the session is being restored, send anonymous visitors to the
//! sign-in page, and send customers away from the back-office.

use std::fmt;

/// A storefront view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Landing page
    Home,
    /// Sign-in entry point
    SignIn,
    /// Account creation
    Register,
    /// Catalog browser
    Books,
    /// Shopping cart
    Cart,
    /// Order history
    MyOrders,
    /// Customer dashboard
    Dashboard,
    /// Back-office overview
    Admin,
    /// Back-office inventory
    AdminBooks,
    /// Back-office order desk
    AdminOrders,
    /// Anything else
    NotFound,
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone
    Public,
    /// Signed-in users
    Authenticated,
    /// Signed-in administrators
    Admin,
}

/// Outcome of checking a route against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the route.
    Allow,
    /// Session restoration is still running; show a spinner.
    Wait,
    /// Navigate elsewhere instead.
    Redirect(Route),
}

/// The slice of session state the guards look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthView {
    /// Startup restoration has not finished yet
    pub loading: bool,
    /// A user is signed in
    pub authenticated: bool,
    /// The signed-in user is an administrator
    pub admin: bool,
}

impl Route {
    /// Resolves a location path. Unknown paths map to [`Route::NotFound`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/login" => Self::SignIn,
            "/register" => Self::Register,
            "/books" => Self::Books,
            "/cart" => Self::Cart,
            "/my-orders" => Self::MyOrders,
            "/dashboard" => Self::Dashboard,
            "/admin" => Self::Admin,
            "/admin/books" => Self::AdminBooks,
            "/admin/orders" => Self::AdminOrders,
            _ => Self::NotFound,
        }
    }

    /// Canonical location path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::SignIn => "/login",
            Self::Register => "/register",
            Self::Books => "/books",
            Self::Cart => "/cart",
            Self::MyOrders => "/my-orders",
            Self::Dashboard => "/dashboard",
            Self::Admin => "/admin",
            Self::AdminBooks => "/admin/books",
            Self::AdminOrders => "/admin/orders",
            Self::NotFound => "/404",
        }
    }

    /// Access level required to open this route.
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Cart | Self::MyOrders | Self::Dashboard => Access::Authenticated,
            Self::Admin | Self::AdminBooks | Self::AdminOrders => Access::Admin,
            Self::Home | Self::SignIn | Self::Register | Self::Books | Self::NotFound => {
                Access::Public
            }
        }
    }

    /// Decides whether `view` may open this route.
    #[must_use]
    pub const fn guard(self, view: AuthView) -> GuardDecision {
        match self.access() {
            Access::Public => GuardDecision::Allow,
            _ if view.loading => GuardDecision::Wait,
            _ if !view.authenticated => GuardDecision::Redirect(Self::SignIn),
            Access::Admin if !view.admin => GuardDecision::Redirect(Self::Dashboard),
            Access::Authenticated | Access::Admin => GuardDecision::Allow,
        }
    }

    /// Where a user lands right after signing in.
    #[must_use]
    pub const fn after_sign_in(admin: bool) -> Self {
        if admin { Self::Admin } else { Self::Books }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ANONYMOUS: AuthView = AuthView {
        loading: false,
        authenticated: false,
        admin: false,
    };
    const CUSTOMER: AuthView = AuthView {
        loading: false,
        authenticated: true,
        admin: false,
    };
    const ADMIN: AuthView = AuthView {
        loading: false,
        authenticated: true,
        admin: true,
    };

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/login?next=/cart"), Route::SignIn);
        assert_eq!(Route::parse("/admin/orders/"), Route::AdminOrders);
        assert_eq!(Route::parse("/nope"), Route::NotFound);
    }

    #[test]
    fn test_public_routes_always_allowed() {
        assert_eq!(Route::Books.guard(ANONYMOUS), GuardDecision::Allow);
        assert_eq!(
            Route::SignIn.guard(AuthView {
                loading: true,
                ..ANONYMOUS
            }),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_protected_routes() {
        assert_eq!(
            Route::Cart.guard(ANONYMOUS),
            GuardDecision::Redirect(Route::SignIn)
        );
        assert_eq!(
            Route::Cart.guard(AuthView {
                loading: true,
                ..ANONYMOUS
            }),
            GuardDecision::Wait
        );
        assert_eq!(Route::MyOrders.guard(CUSTOMER), GuardDecision::Allow);
    }

    #[test]
    fn test_admin_routes() {
        assert_eq!(
            Route::AdminBooks.guard(ANONYMOUS),
            GuardDecision::Redirect(Route::SignIn)
        );
        assert_eq!(
            Route::AdminBooks.guard(CUSTOMER),
            GuardDecision::Redirect(Route::Dashboard)
        );
        assert_eq!(Route::Admin.guard(ADMIN), GuardDecision::Allow);
    }

    #[test]
    fn test_landing_after_sign_in() {
        assert_eq!(Route::after_sign_in(true), Route::Admin);
        assert_eq!(Route::after_sign_in(false), Route::Books);
    }
}
