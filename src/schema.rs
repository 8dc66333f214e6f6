table! {
    booking_histories (id) {
        id -> Integer,
        table_id -> Nullable<Integer>,
        client_id -> Nullable<Integer>,
        date_reserved -> Date,
        time_reserved -> Time,
        duration -> Integer,
        message -> Nullable<Text>,
        created_at -> Timestamp,
        cancelled_at -> Timestamp,
    }
}

table! {
    bookings (id) {
        id -> Integer,
        table_id -> Nullable<Integer>,
        client_id -> Nullable<Integer>,
        date_reserved -> Date,
        time_reserved -> Time,
        duration -> Integer,
        message -> Nullable<Text>,
        created_at -> Timestamp,
        is_active -> Bool,
    }
}

table! {
    password_resets (token) {
        token -> Text,
        user_id -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    restaurant_tables (id) {
        id -> Integer,
        number -> Integer,
        seats -> Integer,
        is_booked -> Bool,
    }
}

table! {
    user_logins (token) {
        token -> Text,
        user_id -> Integer,
        login_time -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Integer,
        email -> Text,
        password -> Text,
        first_name -> Text,
        last_name -> Text,
        phone -> Nullable<Text>,
        country -> Text,
        about_me -> Nullable<Text>,
        avatar -> Nullable<Text>,
        notes -> Nullable<Text>,
        is_staff -> Bool,
        is_active -> Bool,
        date_joined -> Timestamp,
    }
}

joinable!(booking_histories -> restaurant_tables (table_id));
joinable!(booking_histories -> users (client_id));
joinable!(bookings -> restaurant_tables (table_id));
joinable!(bookings -> users (client_id));
joinable!(password_resets -> users (user_id));
joinable!(user_logins -> users (user_id));

allow_tables_to_appear_in_same_query!(
    booking_histories,
    bookings,
    password_resets,
    restaurant_tables,
    user_logins,
    users,
);
