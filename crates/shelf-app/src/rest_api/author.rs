use shelf_dal::{
    author::{Author, AuthorRepository, CreateAuthor, UpdateAuthor},
    Predicate,
};

use crate::{
    crud_api, crud_router,
    policy::ResourceKind,
    rest_api::descriptor::{timestamp, ResourceDescriptor},
};

pub static AUTHORS: ResourceDescriptor<Author> = ResourceDescriptor {
    name: "authors",
    kind: ResourceKind::Author,
    id: |author: &Author| author.id,
    fields: crate::presenter_fields!(Author;
        id,
        given_name,
        family_name,
        created_at => timestamp,
        updated_at => timestamp,
    ),
    sortable: &["id", "given_name", "family_name", "created_at", "updated_at"],
    filters: &[
        ("id", Predicate::Eq),
        ("id", Predicate::Lt),
        ("id", Predicate::Lteq),
        ("id", Predicate::Gt),
        ("id", Predicate::Gteq),
        ("given_name", Predicate::Cont),
        ("given_name", Predicate::Eq),
        ("given_name", Predicate::NotEq),
        ("given_name", Predicate::Start),
        ("given_name", Predicate::End),
        ("family_name", Predicate::Cont),
        ("family_name", Predicate::Eq),
        ("family_name", Predicate::NotEq),
        ("family_name", Predicate::Start),
        ("family_name", Predicate::End),
    ],
};

crud_api!(Author, AUTHORS);
crud_router!();
