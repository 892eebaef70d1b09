use shelf_dal::{
    user::{CreateUser, UpdateUser, User, UserRepository},
    Predicate,
};

use crate::{
    crud_api, crud_router,
    policy::ResourceKind,
    rest_api::descriptor::{optional_timestamp, timestamp, ResourceDescriptor},
};

/// Password digest is never exposed
pub static USERS: ResourceDescriptor<User> = ResourceDescriptor {
    name: "users",
    kind: ResourceKind::User,
    id: |user: &User| user.id,
    fields: crate::presenter_fields!(User;
        id,
        email,
        given_name,
        family_name,
        role,
        last_logged_in_at => optional_timestamp,
        created_at => timestamp,
        updated_at => timestamp,
    ),
    sortable: &[
        "id",
        "email",
        "given_name",
        "family_name",
        "role",
        "last_logged_in_at",
        "created_at",
        "updated_at",
    ],
    filters: &[
        ("id", Predicate::Eq),
        ("id", Predicate::Lt),
        ("id", Predicate::Gt),
        ("email", Predicate::Cont),
        ("email", Predicate::Eq),
        ("email", Predicate::Start),
        ("email", Predicate::End),
        ("given_name", Predicate::Cont),
        ("given_name", Predicate::Eq),
        ("given_name", Predicate::Start),
        ("family_name", Predicate::Cont),
        ("family_name", Predicate::Eq),
        ("family_name", Predicate::Start),
        ("role", Predicate::Eq),
        ("role", Predicate::NotEq),
    ],
};

crud_api!(User, USERS);
crud_router!();
