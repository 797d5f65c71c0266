//! Per-stage contract tests: parser, binder and expansion validator.

pub mod binder_contract;
pub mod parser_contract;
pub mod validator_contract;

use uriq::{EntityModel, EntityType, PrimitiveKind, TypeRef};

/// Shared fixture: a small commerce model with inheritance, an open type,
/// collection navigations and a primitive collection property.
pub fn sample_model() -> EntityModel {
    let mut model = EntityModel::new();
    model
        .add_entity_type(EntityType::new("NS.Account").open())
        .expect("add account type");
    model
        .add_entity_type(
            EntityType::new("NS.Item")
                .with_property("Name", TypeRef::primitive(PrimitiveKind::String))
                .with_property("Price", TypeRef::primitive(PrimitiveKind::Double))
                .with_navigation("Supplier", "NS.Account", false),
        )
        .expect("add item type");
    model
        .add_entity_type(
            EntityType::new("NS.Order")
                .with_property("Id", TypeRef::primitive(PrimitiveKind::Int32))
                .with_property("Total", TypeRef::primitive(PrimitiveKind::Double))
                .with_property("Number", TypeRef::primitive(PrimitiveKind::String))
                .with_navigation("Items", "NS.Item", true),
        )
        .expect("add order type");
    model
        .add_entity_type(
            EntityType::new("NS.Customer")
                .with_property("Name", TypeRef::primitive(PrimitiveKind::String))
                .with_property("Age", TypeRef::primitive(PrimitiveKind::Int32))
                .with_property(
                    "Emails",
                    TypeRef::collection(TypeRef::primitive(PrimitiveKind::String)),
                )
                .with_navigation("Orders", "NS.Order", true)
                .with_navigation("Account", "NS.Account", false),
        )
        .expect("add customer type");
    model
        .add_entity_type(
            EntityType::new("NS.VipCustomer")
                .with_base("NS.Customer")
                .with_property("Discount", TypeRef::primitive(PrimitiveKind::Double)),
        )
        .expect("add vip customer type");
    model
        .add_entity_set("Customers", "NS.Customer")
        .expect("add customer set");
    model
        .add_entity_set("Orders", "NS.Order")
        .expect("add order set");
    model
}
