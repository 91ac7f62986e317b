pub mod merchandise_sale_test;
pub mod registration_rules_test;
