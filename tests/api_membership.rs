//! Integration tests per la macchina a stati della membership
//!
//! Test per:
//! - POST /carpools/{id}/join | cancel | leave
//! - GET /carpools/{id}/requests
//! - POST /carpools/{id}/requests/{user_id}/{action}

mod common;

#[cfg(test)]
mod membership_tests {
    use super::common::*;
    use carpool_server::entities::CarpoolId;
    use carpool_server::ws::ChangeKind;
    use serde_json::Value;

    async fn membership_action(
        server: &axum_test::TestServer,
        token: &str,
        path: String,
    ) -> axum_test::TestResponse {
        server
            .post(&path)
            .add_header(auth_header(), bearer(token))
            .await
    }

    // ============================================================
    // Scenario completo: Practice -> School
    // ============================================================

    #[tokio::test]
    async fn test_practice_scenario() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (rider, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        // A chiede di unirsi -> PENDING
        let joined = membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;
        joined.assert_status_ok();
        let joined: Value = joined.json();
        assert_eq!(joined["state"], "PENDING");
        assert_eq!(joined["revision"], 1);
        assert_eq!(joined["changed"], true);

        // l'owner approva -> MEMBER
        let approved = membership_action(
            &server,
            &owner_token,
            format!("/carpools/{}/requests/{}/approve", id, rider.user_id),
        )
        .await;
        approved.assert_status_ok();
        let approved: Value = approved.json();
        assert_eq!(approved["state"], "MEMBER");
        assert_eq!(approved["user_id"], rider.user_id.0);

        // A esce -> NONE
        let left = membership_action(&server, &rider_token, format!("/carpools/{}/leave", id)).await;
        left.assert_status_ok();
        let left: Value = left.json();
        assert_eq!(left["state"], "NONE");

        // tre transizioni, tre incrementi di revisione
        let carpool = state.carpools.get(CarpoolId(id)).unwrap();
        assert_eq!(carpool.revision(), 3);
        assert!(carpool.members().is_empty());
        assert!(carpool.pending_requests().is_empty());
    }

    // ============================================================
    // Test per POST /carpools/{id}/join - join_carpool
    // ============================================================

    #[tokio::test]
    async fn test_join_twice_is_idempotent() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (_, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        let first: Value = membership_action(&server, &rider_token, format!("/carpools/{}/join", id))
            .await
            .json();
        let second = membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;

        second.assert_status_ok();
        let second: Value = second.json();
        assert_eq!(first["state"], "PENDING");
        assert_eq!(second["state"], "PENDING");
        assert_eq!(second["changed"], false);
        assert_eq!(second["revision"], first["revision"]);
    }

    #[tokio::test]
    async fn test_owner_cannot_join_own_carpool() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        membership_action(&server, &owner_token, format!("/carpools/{}/join", id))
            .await
            .assert_status_conflict();
        assert_eq!(state.carpools.get(CarpoolId(id)).unwrap().revision(), 0);
    }

    #[tokio::test]
    async fn test_join_unknown_carpool() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, token) = create_test_user(&state, "rider@example.com", "Rider").await;

        membership_action(&server, &token, "/carpools/77/join".to_string())
            .await
            .assert_status_not_found();
    }

    // ============================================================
    // Test per POST /carpools/{id}/cancel e /leave
    // ============================================================

    #[tokio::test]
    async fn test_join_then_cancel_returns_to_none() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (rider, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        membership_action(&server, &rider_token, format!("/carpools/{}/join", id))
            .await
            .assert_status_ok();
        let cancelled = membership_action(&server, &rider_token, format!("/carpools/{}/cancel", id)).await;

        cancelled.assert_status_ok();
        let cancelled: Value = cancelled.json();
        assert_eq!(cancelled["state"], "NONE");
        assert_eq!(cancelled["revision"], 2);
        assert!(!state.carpools.get(CarpoolId(id)).unwrap().is_participant(rider.user_id));

        // retry dopo una risposta persa: successo senza cambiare la revisione
        let retried = membership_action(&server, &rider_token, format!("/carpools/{}/cancel", id)).await;
        retried.assert_status_ok();
        let retried: Value = retried.json();
        assert_eq!(retried["state"], "NONE");
        assert_eq!(retried["changed"], false);
        assert_eq!(retried["revision"], 2);
    }

    #[tokio::test]
    async fn test_owner_cannot_cancel_on_own_carpool() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        membership_action(&server, &owner_token, format!("/carpools/{}/cancel", id))
            .await
            .assert_status_conflict();
    }

    #[tokio::test]
    async fn test_leave_from_none_is_rejected() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (_, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        let response = membership_action(&server, &rider_token, format!("/carpools/{}/leave", id)).await;

        response.assert_status_conflict();
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid membership transition");
        assert_eq!(state.carpools.get(CarpoolId(id)).unwrap().revision(), 0);
    }

    #[tokio::test]
    async fn test_leave_while_pending_is_rejected() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (_, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;
        membership_action(&server, &rider_token, format!("/carpools/{}/leave", id))
            .await
            .assert_status_conflict();
    }

    // ============================================================
    // Test per le azioni dell'owner - list_requests, respond_to_request
    // ============================================================

    #[tokio::test]
    async fn test_owner_lists_pending_requests() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (rider, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;
        membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;

        let response = server
            .get(&format!("/carpools/{}/requests", id))
            .add_header(auth_header(), bearer(&owner_token))
            .await;

        response.assert_status_ok();
        let requests: Vec<Value> = response.json();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["user_id"], rider.user_id.0);
        assert_eq!(requests[0]["display_name"], "Rider");

        // solo l'owner vede le richieste
        server
            .get(&format!("/carpools/{}/requests", id))
            .add_header(auth_header(), bearer(&rider_token))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_decline_returns_requester_to_none() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (rider, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;
        membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;

        let declined = membership_action(
            &server,
            &owner_token,
            format!("/carpools/{}/requests/{}/decline", id, rider.user_id),
        )
        .await;

        declined.assert_status_ok();
        let declined: Value = declined.json();
        assert_eq!(declined["state"], "NONE");

        // il rider può chiedere di nuovo
        let again: Value = membership_action(&server, &rider_token, format!("/carpools/{}/join", id))
            .await
            .json();
        assert_eq!(again["state"], "PENDING");
    }

    #[tokio::test]
    async fn test_non_owner_cannot_approve() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (rider, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;
        membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;

        // un utente non può approvarsi da solo
        membership_action(
            &server,
            &rider_token,
            format!("/carpools/{}/requests/{}/approve", id, rider.user_id),
        )
        .await
        .assert_status_forbidden();
        assert_eq!(
            state.carpools.get(CarpoolId(id)).unwrap().membership_of(rider.user_id),
            carpool_server::entities::MembershipState::Pending
        );
    }

    #[tokio::test]
    async fn test_approve_without_request_is_rejected() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (rider, _) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        membership_action(
            &server,
            &owner_token,
            format!("/carpools/{}/requests/{}/approve", id, rider.user_id),
        )
        .await
        .assert_status_conflict();
    }

    #[tokio::test]
    async fn test_invalid_action_is_bad_request() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (rider, _) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        membership_action(
            &server,
            &owner_token,
            format!("/carpools/{}/requests/{}/promote", id, rider.user_id),
        )
        .await
        .assert_status_bad_request();
    }

    // ============================================================
    // Concorrenza e notifiche
    // ============================================================

    #[tokio::test]
    async fn test_concurrent_joins_both_succeed() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (first, first_token) = create_test_user(&state, "first@example.com", "First").await;
        let (second, second_token) = create_test_user(&state, "second@example.com", "Second").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        let (a, b) = tokio::join!(
            membership_action(&server, &first_token, format!("/carpools/{}/join", id)),
            membership_action(&server, &second_token, format!("/carpools/{}/join", id)),
        );
        a.assert_status_ok();
        b.assert_status_ok();

        let carpool = state.carpools.get(CarpoolId(id)).unwrap();
        assert!(carpool.pending_requests().contains(&first.user_id));
        assert!(carpool.pending_requests().contains(&second.user_id));
        assert_eq!(carpool.revision(), 2);
    }

    #[tokio::test]
    async fn test_watchers_are_notified_of_changes() {
        let state = create_test_state();
        let server = create_test_server(state.clone());
        let (_, owner_token) = create_test_user(&state, "owner@example.com", "Owner").await;
        let (_, rider_token) = create_test_user(&state, "rider@example.com", "Rider").await;
        let id = publish_carpool(&server, &owner_token, "Practice", "School").await;

        let mut rx = state.feed.subscribe(CarpoolId(id));

        membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;
        // richiesta ripetuta: nessuna notifica
        membership_action(&server, &rider_token, format!("/carpools/{}/join", id)).await;
        server
            .delete(&format!("/carpools/{}", id))
            .add_header(auth_header(), bearer(&owner_token))
            .await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, ChangeKind::Membership);
        assert_eq!(first.revision, 1);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, ChangeKind::Deleted);
        assert_eq!(second.carpool_id, CarpoolId(id));
    }
}
