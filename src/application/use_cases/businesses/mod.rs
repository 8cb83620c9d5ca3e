pub mod add_member;
pub mod create_business;
pub mod delete_business;
pub mod get_business;
pub mod list_businesses;
pub mod list_members;
pub mod lookup_company;
pub mod remove_member;
pub mod update_business;
