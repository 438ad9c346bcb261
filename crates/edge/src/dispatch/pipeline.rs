//! The ordered dispatch pipeline
//!
//! Stages run in the order of [`STAGES`]; the first stage to return an
//! outcome terminates the pipeline. Reordering stages changes observable
//! behavior (rewrite before auth redirect before guard) and is a breaking
//! change - the order lives in exactly one place, below.

use url::form_urlencoded;

use super::redirect::{is_safe_redirect_target, safe_redirect_target, workspace_root_path};
use super::session::SessionPresence;
use super::{SIGN_IN_PATH, SIGN_UP_PATH, START_PATH, WORKSPACES_PREFIX};
use crate::host::HostClass;
use crate::routing::TenantResolver;

/// Terminal result of the pipeline for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No stage matched; serve the request unmodified.
    PassThrough,
    /// Internal route rewrite, invisible to the client. The original query
    /// string is preserved by the caller.
    Rewrite { path: String },
    /// Client-visible 302 redirect.
    Redirect { location: String },
}

/// Everything a stage is allowed to look at
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub host: HostClass,
    pub path: String,
    /// Decoded `redirect` query parameter, if present.
    pub redirect_param: Option<String>,
    pub session: SessionPresence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    SubdomainRewrite,
    AuthPageRedirect,
    StartPageRedirect,
    FeedbackSubdomainRewrite,
    WorkspaceAuthGuard,
}

/// The pipeline's stage order. Load-bearing; do not reorder.
const STAGES: &[Stage] = &[
    Stage::SubdomainRewrite,
    Stage::AuthPageRedirect,
    Stage::StartPageRedirect,
    Stage::FeedbackSubdomainRewrite,
    Stage::WorkspaceAuthGuard,
];

/// Orchestrates the dispatch stages; holds no per-request state.
#[derive(Clone)]
pub struct DispatchPipeline {
    resolver: TenantResolver,
}

impl DispatchPipeline {
    pub fn new(resolver: TenantResolver) -> Self {
        Self { resolver }
    }

    /// Run the stages in fixed order; first outcome wins.
    pub async fn dispatch(&self, ctx: &RequestContext) -> DispatchOutcome {
        for stage in STAGES {
            if let Some(outcome) = self.run_stage(*stage, ctx).await {
                tracing::debug!(?stage, ?outcome, path = %ctx.path, "dispatch stage terminated");
                return outcome;
            }
        }
        DispatchOutcome::PassThrough
    }

    async fn run_stage(&self, stage: Stage, ctx: &RequestContext) -> Option<DispatchOutcome> {
        match stage {
            Stage::SubdomainRewrite => self.subdomain_rewrite(ctx).await,
            Stage::AuthPageRedirect => auth_page_redirect(ctx),
            Stage::StartPageRedirect => start_page_redirect(ctx),
            Stage::FeedbackSubdomainRewrite => self.feedback_subdomain_rewrite(ctx).await,
            Stage::WorkspaceAuthGuard => workspace_auth_guard(ctx),
        }
    }

    /// Tenant host -> prefix the path with the slug so downstream handlers
    /// receive a tenant-scoped route. Feedback vanity hosts are handled by
    /// their own stage; unresolved hosts fall through.
    async fn subdomain_rewrite(&self, ctx: &RequestContext) -> Option<DispatchOutcome> {
        if ctx.host.is_main_domain
            || ctx.host.is_feedback_host()
            || ctx.host.host_no_port.is_empty()
        {
            return None;
        }

        let tenant = self.resolver.resolve(&ctx.host.host_no_port).await?;
        let slug = &tenant.slug;

        // Already tenant-scoped (e.g. a retried internal request): leave it
        if ctx.path == format!("/{slug}") || ctx.path.starts_with(&format!("/{slug}/")) {
            return None;
        }

        Some(DispatchOutcome::Rewrite {
            path: format!("/{slug}{}", ctx.path),
        })
    }

    /// `feedback.<host>`: rewrite the small fixed set of vanity paths into
    /// the tenant's board routes. Anything else falls through untouched.
    async fn feedback_subdomain_rewrite(&self, ctx: &RequestContext) -> Option<DispatchOutcome> {
        if !ctx.host.is_feedback_host() || ctx.host.is_main_domain {
            return None;
        }

        let tenant = self.resolver.resolve(&ctx.host.host_no_port).await?;
        let slug = &tenant.slug;

        let path = match ctx.path.as_str() {
            "/" => format!("/{slug}/{slug}"),
            "/roadmap" => format!("/{slug}/roadmap"),
            "/changelog" => format!("/{slug}/changelog"),
            path if path.starts_with("/board/") => format!("/{slug}{path}"),
            _ => return None,
        };

        Some(DispatchOutcome::Rewrite { path })
    }
}

/// Signed-in users never see the sign-in/sign-up pages; send them where
/// they were headed (validated), or to their last workspace, or to start.
fn auth_page_redirect(ctx: &RequestContext) -> Option<DispatchOutcome> {
    if ctx.path != SIGN_IN_PATH && ctx.path != SIGN_UP_PATH {
        return None;
    }
    if !ctx.session.has_session {
        return None;
    }

    Some(DispatchOutcome::Redirect {
        location: safe_redirect_target(
            ctx.redirect_param.as_deref(),
            ctx.session.last_workspace_slug.as_deref(),
        ),
    })
}

/// The start page redirects a signed-in user onward only when the chain
/// yields somewhere else to go; otherwise the page renders its default.
fn start_page_redirect(ctx: &RequestContext) -> Option<DispatchOutcome> {
    if ctx.path != START_PATH || !ctx.session.has_session {
        return None;
    }

    if let Some(candidate) = ctx.redirect_param.as_deref() {
        if is_safe_redirect_target(candidate) && candidate != START_PATH {
            return Some(DispatchOutcome::Redirect {
                location: candidate.to_string(),
            });
        }
    }

    match ctx.session.last_workspace_slug.as_deref() {
        Some(slug) if !slug.is_empty() => Some(DispatchOutcome::Redirect {
            location: workspace_root_path(slug),
        }),
        _ => None,
    }
}

/// Workspace area requires a session; bounce to sign-in carrying the
/// original path so the auth-page redirect can send the user back.
fn workspace_auth_guard(ctx: &RequestContext) -> Option<DispatchOutcome> {
    let in_workspaces = ctx.path == WORKSPACES_PREFIX
        || ctx
            .path
            .strip_prefix(WORKSPACES_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'));
    if !in_workspaces || ctx.session.has_session {
        return None;
    }

    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", &ctx.path)
        .finish();

    Some(DispatchOutcome::Redirect {
        location: format!("{SIGN_IN_PATH}?{query}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::testing::FakeDirectory;
    use std::sync::Arc;
    use std::time::Duration;

    fn pipeline(fake: FakeDirectory) -> DispatchPipeline {
        let resolver = TenantResolver::new(Arc::new(fake), Duration::from_secs(30));
        DispatchPipeline::new(resolver)
    }

    fn ctx(host: &str, is_main: bool, path: &str) -> RequestContext {
        RequestContext {
            host: HostClass {
                host_no_port: host.to_string(),
                is_main_domain: is_main,
            },
            path: path.to_string(),
            redirect_param: None,
            session: SessionPresence::default(),
        }
    }

    fn with_session(mut ctx: RequestContext, last_workspace: Option<&str>) -> RequestContext {
        ctx.session.has_session = true;
        ctx.session.last_workspace_slug = last_workspace.map(str::to_string);
        ctx
    }

    #[tokio::test]
    async fn test_main_domain_never_rewrites() {
        let pipeline = pipeline(FakeDirectory::with_tenant("acme", "signalboard.io", None));

        let outcome = pipeline
            .dispatch(&ctx("signalboard.io", true, "/pricing"))
            .await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_subdomain_rewrite_embeds_slug() {
        let pipeline = pipeline(FakeDirectory::with_tenant(
            "acme",
            "acme.signalboard.io",
            None,
        ));

        let outcome = pipeline
            .dispatch(&ctx("acme.signalboard.io", false, "/posts/42"))
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::Rewrite {
                path: "/acme/posts/42".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_subdomain_rewrite_tolerates_legacy_host_formats() {
        for stored in [
            "acme.signalboard.io",
            "https://acme.signalboard.io",
            "https://acme.signalboard.io/",
        ] {
            let pipeline = pipeline(FakeDirectory::with_tenant("acme", stored, None));
            let outcome = pipeline
                .dispatch(&ctx("acme.signalboard.io", false, "/"))
                .await;
            assert_eq!(
                outcome,
                DispatchOutcome::Rewrite {
                    path: "/acme/".to_string()
                },
                "stored form {stored}"
            );
        }
    }

    #[tokio::test]
    async fn test_unresolved_host_passes_through() {
        let pipeline = pipeline(FakeDirectory::default());

        let outcome = pipeline
            .dispatch(&ctx("ghost.signalboard.io", false, "/anything"))
            .await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_store_outage_passes_through() {
        let fake = FakeDirectory::with_tenant("acme", "acme.signalboard.io", None);
        fake.fail_lookups(true);
        let pipeline = pipeline(fake);

        let outcome = pipeline
            .dispatch(&ctx("acme.signalboard.io", false, "/posts"))
            .await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent_on_retried_internal_path() {
        let pipeline = pipeline(FakeDirectory::with_tenant(
            "acme",
            "acme.signalboard.io",
            None,
        ));

        let first = pipeline
            .dispatch(&ctx("acme.signalboard.io", false, "/posts/42"))
            .await;
        let DispatchOutcome::Rewrite { path } = first.clone() else {
            panic!("expected rewrite, got {first:?}");
        };

        // Running the pipeline again on the rewritten path must not stack
        // another slug prefix
        let second = pipeline
            .dispatch(&ctx("acme.signalboard.io", false, &path))
            .await;
        assert_eq!(second, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_auth_page_redirect_uses_validated_candidate() {
        let pipeline = pipeline(FakeDirectory::default());

        let mut request = with_session(
            ctx("signalboard.io", true, "/auth/sign-in"),
            Some("acme"),
        );
        request.redirect_param = Some("/workspaces/acme".to_string());

        let outcome = pipeline.dispatch(&request).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Redirect {
                location: "/workspaces/acme".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_auth_page_redirect_discards_foreign_url() {
        let pipeline = pipeline(FakeDirectory::default());

        let mut request = with_session(
            ctx("signalboard.io", true, "/auth/sign-in"),
            Some("acme"),
        );
        request.redirect_param = Some("https://evil.example/phish".to_string());

        let outcome = pipeline.dispatch(&request).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Redirect {
                location: "/workspaces/acme".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_auth_page_redirect_defaults_to_start() {
        let pipeline = pipeline(FakeDirectory::default());

        let request = with_session(ctx("signalboard.io", true, "/auth/sign-up"), None);
        let outcome = pipeline.dispatch(&request).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Redirect {
                location: "/start".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_auth_page_without_session_passes_through() {
        let pipeline = pipeline(FakeDirectory::default());

        let outcome = pipeline
            .dispatch(&ctx("signalboard.io", true, "/auth/sign-in"))
            .await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_start_page_redirects_to_last_workspace() {
        let pipeline = pipeline(FakeDirectory::default());

        let request = with_session(ctx("signalboard.io", true, "/start"), Some("acme"));
        let outcome = pipeline.dispatch(&request).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Redirect {
                location: "/workspaces/acme".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_start_page_renders_default_when_chain_yields_nothing() {
        let pipeline = pipeline(FakeDirectory::default());

        // No candidate, no last workspace: the chain would land back on
        // /start, so the stage lets the page render instead of looping
        let request = with_session(ctx("signalboard.io", true, "/start"), None);
        let outcome = pipeline.dispatch(&request).await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_feedback_fixed_path_set() {
        let mut fake = FakeDirectory::default();
        fake.add_tenant("acme", "acme.signalboard.io", Some("custom-domain.com"));
        let pipeline = pipeline(fake);

        let cases = [
            ("/", "/acme/acme"),
            ("/roadmap", "/acme/roadmap"),
            ("/changelog", "/acme/changelog"),
            ("/board/123", "/acme/board/123"),
        ];
        for (path, expected) in cases {
            let outcome = pipeline
                .dispatch(&ctx("feedback.custom-domain.com", false, path))
                .await;
            assert_eq!(
                outcome,
                DispatchOutcome::Rewrite {
                    path: expected.to_string()
                },
                "path {path}"
            );
        }
    }

    #[tokio::test]
    async fn test_feedback_path_outside_set_passes_through() {
        let mut fake = FakeDirectory::default();
        fake.add_tenant("acme", "acme.signalboard.io", Some("custom-domain.com"));
        let pipeline = pipeline(fake);

        let outcome = pipeline
            .dispatch(&ctx("feedback.custom-domain.com", false, "/pricing"))
            .await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_feedback_host_without_tenant_passes_through() {
        let pipeline = pipeline(FakeDirectory::default());

        let outcome = pipeline
            .dispatch(&ctx("feedback.unknown.com", false, "/roadmap"))
            .await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_workspace_guard_redirects_without_session() {
        let pipeline = pipeline(FakeDirectory::default());

        let outcome = pipeline
            .dispatch(&ctx("signalboard.io", true, "/workspaces/acme/settings"))
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::Redirect {
                location: "/auth/sign-in?redirect=%2Fworkspaces%2Facme%2Fsettings".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_workspace_guard_round_trips_original_path() {
        let pipeline = pipeline(FakeDirectory::default());

        let original = "/workspaces/acme/posts/a b";
        let outcome = pipeline.dispatch(&ctx("signalboard.io", true, original)).await;

        let DispatchOutcome::Redirect { location } = outcome else {
            panic!("expected redirect");
        };
        let query = location.split_once('?').map(|(_, q)| q).unwrap();
        let decoded: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(
            decoded,
            vec![("redirect".to_string(), original.to_string())]
        );
    }

    #[tokio::test]
    async fn test_workspace_guard_lets_sessions_through() {
        let pipeline = pipeline(FakeDirectory::default());

        let request = with_session(ctx("signalboard.io", true, "/workspaces/acme"), None);
        let outcome = pipeline.dispatch(&request).await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_workspace_guard_prefix_is_path_segment_aware() {
        let pipeline = pipeline(FakeDirectory::default());

        // "/workspacesfoo" is not under the protected prefix
        let outcome = pipeline
            .dispatch(&ctx("signalboard.io", true, "/workspacesfoo"))
            .await;
        assert_eq!(outcome, DispatchOutcome::PassThrough);
    }
}
