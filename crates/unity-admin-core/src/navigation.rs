//! Console routes and the route guard.
//!
//! The guard is the only contract between the session and the routing
//! layer: any view other than the login screen needs a credential.

use std::fmt;

use crate::auth::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Platforms,
    QuestionBanks { platform_id: i64 },
    Procedures { bank_id: i64 },
    Questions { procedure_id: i64 },
    QuestionCreate { procedure_id: i64 },
    QuestionEdit { procedure_id: i64, question_id: i64 },
    Assessments,
    Sessions,
    SessionDetail { id: i64 },
    Simulator,
    Users,
    NotFound,
}

impl Route {
    /// The view shown at `/`.
    pub const HOME: Route = Route::Platforms;

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Platforms => "/platforms".to_string(),
            Route::QuestionBanks { platform_id } => format!("/platforms/{}/banks", platform_id),
            Route::Procedures { bank_id } => format!("/banks/{}/procedures", bank_id),
            Route::Questions { procedure_id } => format!("/procedures/{}/questions", procedure_id),
            Route::QuestionCreate { procedure_id } => {
                format!("/procedures/{}/questions/create", procedure_id)
            }
            Route::QuestionEdit {
                procedure_id,
                question_id,
            } => format!("/procedures/{}/questions/{}/edit", procedure_id, question_id),
            Route::Assessments => "/assessments".to_string(),
            Route::Sessions => "/sessions".to_string(),
            Route::SessionDetail { id } => format!("/sessions/{}", id),
            Route::Simulator => "/simulator".to_string(),
            Route::Users => "/users".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Resolve a path. Unknown paths resolve to `Route::NotFound`.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        fn id(segment: &str) -> Option<i64> {
            segment.parse().ok()
        }

        let route = match segments.as_slice() {
            [] => Some(Route::HOME),
            ["login"] => Some(Route::Login),
            ["platforms"] => Some(Route::Platforms),
            ["platforms", p, "banks"] => id(p).map(|platform_id| Route::QuestionBanks { platform_id }),
            ["banks", b, "procedures"] => id(b).map(|bank_id| Route::Procedures { bank_id }),
            ["procedures", p, "questions"] => {
                id(p).map(|procedure_id| Route::Questions { procedure_id })
            }
            ["procedures", p, "questions", "create"] => {
                id(p).map(|procedure_id| Route::QuestionCreate { procedure_id })
            }
            ["procedures", p, "questions", q, "edit"] => {
                id(p).zip(id(q)).map(|(procedure_id, question_id)| Route::QuestionEdit {
                    procedure_id,
                    question_id,
                })
            }
            ["assessments"] => Some(Route::Assessments),
            ["sessions"] => Some(Route::Sessions),
            ["sessions", s] => id(s).map(|id| Route::SessionDetail { id }),
            ["simulator"] => Some(Route::Simulator),
            ["users"] => Some(Route::Users),
            _ => None,
        };

        route.unwrap_or(Route::NotFound)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Platforms => "Platforms",
            Route::QuestionBanks { .. } => "Question Banks",
            Route::Procedures { .. } => "Procedures",
            Route::Questions { .. } => "Questions",
            Route::QuestionCreate { .. } => "Create Question",
            Route::QuestionEdit { .. } => "Edit Question",
            Route::Assessments => "Assessments",
            Route::Sessions => "Session Results",
            Route::SessionDetail { .. } => "Session Detail",
            Route::Simulator => "Examinee Simulator",
            Route::Users => "Users",
            Route::NotFound => "Not Found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Allow the login view unconditionally, anything else only with a
    /// credential.
    pub fn check(&self, target: &Route) -> GuardDecision {
        if *target == Route::Login || self.session.is_authenticated() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(Route::Login)
        }
    }
}
