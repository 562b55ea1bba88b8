diesel::table! {
    customers (id) {
        id -> Uuid,
        company_name -> Varchar,
        is_admin -> Bool,
        created_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    reservations (id) {
        id -> Uuid,
        title -> Varchar,
        date -> Date,
        start_time -> Time,
        end_time -> Time,
        customer_id -> Uuid,
        num_of_participants -> Int4,
        status -> Varchar,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(reservations -> customers (customer_id));

diesel::allow_tables_to_appear_in_same_query!(
    customers,
    reservations,
);
