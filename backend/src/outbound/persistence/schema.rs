//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// Registered users. `email` and `username` are unique.
    users (id) {
        id -> Uuid,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        email -> Varchar,
        username -> Varchar,
        password_hash -> Varchar,
        /// Fallback refresh token slot used when no secret store is configured.
        refresh_token -> Nullable<Text>,
        refresh_token_ip -> Nullable<Varchar>,
        refresh_token_user_agent -> Nullable<Text>,
        refresh_token_issued_at -> Nullable<Timestamptz>,
        refresh_token_last_used -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        /// Maintained by the `users_touch_updated_at` trigger.
        updated_at -> Timestamptz,
    }
}
