//! Unit and router tests for the access crate

#[cfg(test)]
mod rate_limit_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use platform::clock::{Clock, ManualClock};
    use platform::kv::{KeyValueStore, KvError, KvResult, MemoryKvStore};
    use platform::rate_limit::RateLimitConfig;

    use crate::application::rate_limit::RateLimiter;
    use crate::domain::entities::RateLimitRecord;
    use crate::domain::value_objects::RateLimitDecision;
    use crate::error::AccessError;
    use crate::infra::kv_store::{KvRateLimitRepository, storage_key};

    const FP: &str = "fp-under-test";
    const T0: i64 = 1_700_000_000_000;

    fn limiter(
        clock: Arc<ManualClock>,
        config: RateLimitConfig,
    ) -> (RateLimiter<KvRateLimitRepository<MemoryKvStore>>, MemoryKvStore) {
        let store = MemoryKvStore::with_clock(clock.clone());
        let repo = Arc::new(KvRateLimitRepository::new(store.clone()));
        (RateLimiter::new(repo, clock, config), store)
    }

    fn retry_after(decision: RateLimitDecision) -> u64 {
        match decision {
            RateLimitDecision::Blocked {
                retry_after_secs, ..
            } => retry_after_secs,
            RateLimitDecision::Allowed => panic!("expected a lockout"),
        }
    }

    #[tokio::test]
    async fn test_fresh_fingerprint_is_allowed() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, store) = limiter(clock, RateLimitConfig::default());

        assert!(limiter.check(FP).await.unwrap().is_allowed());
        assert!(store.is_empty(), "check must not create a record");
    }

    #[tokio::test]
    async fn test_failures_below_max_stay_allowed() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, _) = limiter(clock, RateLimitConfig::default());

        assert_eq!(limiter.record_failure(FP).await.unwrap(), 1);
        assert_eq!(limiter.record_failure(FP).await.unwrap(), 2);
        assert!(limiter.check(FP).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_three_failures_lock_out_for_first_tier() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, _) = limiter(clock.clone(), RateLimitConfig::new(3, 900_000));

        for _ in 0..3 {
            limiter.record_failure(FP).await.unwrap();
            clock.advance_ms(1_000);
        }

        let decision = limiter.check(FP).await.unwrap();
        assert_eq!(retry_after(decision), 900);

        // Lockout is persisted: a later check sees the remaining time.
        clock.advance_ms(100_000);
        let decision = limiter.check(FP).await.unwrap();
        assert_eq!(retry_after(decision), 800);
    }

    #[tokio::test]
    async fn test_fifth_failure_escalates_to_second_tier() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, _) = limiter(clock.clone(), RateLimitConfig::new(3, 3_600_000));

        for _ in 0..3 {
            limiter.record_failure(FP).await.unwrap();
        }
        assert_eq!(retry_after(limiter.check(FP).await.unwrap()), 900);

        // Lockout over, still inside the window.
        clock.advance_ms(900_000);
        assert_eq!(limiter.record_failure(FP).await.unwrap(), 4);
        assert_eq!(retry_after(limiter.check(FP).await.unwrap()), 900);

        clock.advance_ms(900_000);
        assert_eq!(limiter.record_failure(FP).await.unwrap(), 5);
        assert_eq!(retry_after(limiter.check(FP).await.unwrap()), 1800);
    }

    #[tokio::test]
    async fn test_lockout_clamps_to_last_tier() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, _) = limiter(clock, RateLimitConfig::new(3, 900_000));

        for _ in 0..20 {
            limiter.record_failure(FP).await.unwrap();
        }

        assert_eq!(retry_after(limiter.check(FP).await.unwrap()), 24 * 60 * 60);
    }

    #[tokio::test]
    async fn test_window_elapse_resets_attempts() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, _) = limiter(clock.clone(), RateLimitConfig::new(3, 900_000));

        limiter.record_failure(FP).await.unwrap();
        limiter.record_failure(FP).await.unwrap();
        clock.advance_ms(900_001);

        assert!(limiter.check(FP).await.unwrap().is_allowed());
        assert_eq!(limiter.record_failure(FP).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reset_unlocks_immediately() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, store) = limiter(clock, RateLimitConfig::default());

        for _ in 0..3 {
            limiter.record_failure(FP).await.unwrap();
        }
        assert!(!limiter.check(FP).await.unwrap().is_allowed());

        limiter.reset(FP).await.unwrap();

        assert!(limiter.check(FP).await.unwrap().is_allowed());
        assert!(store.get(&storage_key(FP)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lockout_record_outlives_window_ttl() {
        let clock = Arc::new(ManualClock::new(T0));
        // 60 s window, 15 min lockout.
        let (limiter, store) = limiter(clock.clone(), RateLimitConfig::new(3, 60_000));

        for _ in 0..3 {
            limiter.record_failure(FP).await.unwrap();
        }
        assert!(!limiter.check(FP).await.unwrap().is_allowed());

        clock.advance_ms(10 * 60 * 1000);
        assert!(store.get(&storage_key(FP)).await.unwrap().is_some());
        assert!(!limiter.check(FP).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_corrupt_record_reads_as_zero_state() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, store) = limiter(clock, RateLimitConfig::default());

        store
            .put(
                &storage_key(FP),
                "{not json".to_string(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert!(limiter.check(FP).await.unwrap().is_allowed());
        assert_eq!(limiter.record_failure(FP).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_is_stored_as_camel_case_json() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, store) = limiter(clock, RateLimitConfig::default());

        limiter.record_failure(FP).await.unwrap();

        let raw = store.get(&storage_key(FP)).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["attempts"], 1);
        assert_eq!(value["lastAttempt"], T0);
        assert!(value.get("timeoutUntil").is_none());

        let record = RateLimitRecord::decode(Some(&raw));
        assert_eq!(record.attempts, 1);
    }

    /// Concurrent failures may lose an increment; the count never exceeds
    /// the number of calls and never drops to zero.
    #[tokio::test]
    async fn test_concurrent_failures_may_lose_an_increment() {
        let clock = Arc::new(ManualClock::new(T0));
        let (limiter, _) = limiter(clock, RateLimitConfig::default());

        let (a, b) = tokio::join!(limiter.record_failure(FP), limiter.record_failure(FP));
        let max = a.unwrap().max(b.unwrap());

        assert!((1..=2).contains(&max));
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> KvResult<Option<String>> {
            Err(KvError::Unavailable("store offline".into()))
        }

        async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> KvResult<()> {
            Err(KvError::Unavailable("store offline".into()))
        }

        async fn delete(&self, _key: &str) -> KvResult<()> {
            Err(KvError::Unavailable("store offline".into()))
        }

        async fn ping(&self) -> KvResult<()> {
            Err(KvError::Unavailable("store offline".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error_not_allowed() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(T0));
        let repo = Arc::new(KvRateLimitRepository::new(FailingStore));
        let limiter = RateLimiter::new(repo, clock, RateLimitConfig::default());

        let err = limiter.check(FP).await.unwrap_err();
        assert!(matches!(err, AccessError::Store(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        assert!(limiter.record_failure(FP).await.is_err());
        assert!(limiter.reset(FP).await.is_err());
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::routing::get;
    use platform::clock::ManualClock;
    use platform::kv::MemoryKvStore;
    use platform::password::HashedPassword;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::config::AccessConfig;
    use crate::infra::kv_store::KvRateLimitRepository;
    use crate::presentation::handlers::AccessAppState;
    use crate::presentation::router::{access_router, guard_all, guard_mutations};

    const T0: i64 = 1_700_000_000_000;
    const PASSWORD: &str = "Correct-Horse-42";

    type Repo = KvRateLimitRepository<MemoryKvStore>;

    fn state(clock: Arc<ManualClock>) -> AccessAppState<Repo> {
        let hash = HashedPassword::from_encoded(platform::password::hash_password(PASSWORD))
            .unwrap();
        let config = AccessConfig::development(hash);
        let repo = KvRateLimitRepository::new(MemoryKvStore::with_clock(clock.clone()));
        AccessAppState::new(repo, config, clock)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(password: &str, csrf_token: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "router-test")
            .body(Body::from(
                json!({ "password": password, "csrf_token": csrf_token }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_csrf_endpoint_returns_verifiable_token() {
        let state = state(Arc::new(ManualClock::new(T0)));
        let app = access_router(state.clone());

        let response = app
            .oneshot(Request::get("/csrf").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let token = body["csrfToken"].as_str().unwrap();
        assert!(state.csrf.verify(token));
    }

    #[tokio::test]
    async fn test_login_success_returns_bearer_token() {
        let state = state(Arc::new(ManualClock::new(T0)));
        let csrf = state.csrf.issue();

        let response = access_router(state.clone())
            .oneshot(login_request(PASSWORD, &csrf))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Authentication successful");
        assert!(state.csrf.verify(body["token"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn test_login_missing_fields_is_bad_request() {
        let state = state(Arc::new(ManualClock::new(T0)));

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"password":"x"}"#))
            .unwrap();
        let response = access_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Password and CSRF token are required");
    }

    #[tokio::test]
    async fn test_login_with_forged_csrf_is_forbidden() {
        let state = state(Arc::new(ManualClock::new(T0)));

        let response = access_router(state)
            .oneshot(login_request(PASSWORD, "00:1:ff"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"], "Invalid CSRF token");
    }

    #[tokio::test]
    async fn test_three_wrong_passwords_then_locked_out() {
        let clock = Arc::new(ManualClock::new(T0));
        let state = state(clock);

        for _ in 0..3 {
            let csrf = state.csrf.issue();
            let response = access_router(state.clone())
                .oneshot(login_request("Wrong-Password-1", &csrf))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(json_body(response).await["error"], "Invalid password");
        }

        let csrf = state.csrf.issue();
        let response = access_router(state.clone())
            .oneshot(login_request(PASSWORD, &csrf))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "900"
        );
        let body = json_body(response).await;
        assert_eq!(body["retryAfter"], 900);
    }

    fn gated_app(state: &AccessAppState<Repo>) -> Router {
        guard_mutations(
            Router::new().route("/items", get(|| async { "list" }).post(|| async { "created" })),
            state,
        )
    }

    #[tokio::test]
    async fn test_reads_pass_mutation_gates() {
        let state = state(Arc::new(ManualClock::new(T0)));

        let response = gated_app(&state)
            .oneshot(Request::get("/items").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mutation_without_csrf_header_is_forbidden() {
        let state = state(Arc::new(ManualClock::new(T0)));
        let bearer = state.csrf.issue();

        let request = Request::post("/items")
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .body(Body::empty())
            .unwrap();
        let response = gated_app(&state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"], "CSRF token required");
    }

    #[tokio::test]
    async fn test_mutation_with_forged_csrf_header_is_forbidden() {
        let state = state(Arc::new(ManualClock::new(T0)));
        let bearer = state.csrf.issue();

        let request = Request::post("/items")
            .header("x-csrf-token", "aa:1:bb")
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .body(Body::empty())
            .unwrap();
        let response = gated_app(&state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"], "Invalid CSRF token");
    }

    #[tokio::test]
    async fn test_mutation_without_bearer_is_unauthorized() {
        let state = state(Arc::new(ManualClock::new(T0)));

        let request = Request::post("/items")
            .header("x-csrf-token", state.csrf.issue())
            .body(Body::empty())
            .unwrap();
        let response = gated_app(&state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_expired_bearer_is_rejected() {
        let clock = Arc::new(ManualClock::new(T0));
        let state = state(clock.clone());
        let bearer = state.csrf.issue();

        clock.advance_ms(3_600_001);
        let request = Request::post("/items")
            .header("x-csrf-token", state.csrf.issue())
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .body(Body::empty())
            .unwrap();
        let response = gated_app(&state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_mutation_with_both_tokens_passes() {
        let state = state(Arc::new(ManualClock::new(T0)));

        let request = Request::post("/items")
            .header("x-csrf-token", state.csrf.issue())
            .header(header::AUTHORIZATION, format!("Bearer {}", state.csrf.issue()))
            .body(Body::empty())
            .unwrap();
        let response = gated_app(&state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guard_all_requires_bearer_on_reads() {
        let state = state(Arc::new(ManualClock::new(T0)));
        let app = guard_all(Router::new().route("/export", get(|| async { "ok" })), &state);

        let response = app
            .clone()
            .oneshot(Request::get("/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::get("/export")
            .header(header::AUTHORIZATION, format!("Bearer {}", state.csrf.issue()))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_locked_out_client_is_blocked_before_other_gates() {
        let state = state(Arc::new(ManualClock::new(T0)));
        let limiter = state.rate_limiter();
        let fp = platform::client::fingerprint(&axum::http::HeaderMap::new(), None);
        for _ in 0..3 {
            limiter.record_failure(fp.as_str()).await.unwrap();
        }

        let response = gated_app(&state)
            .oneshot(Request::post("/items").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
