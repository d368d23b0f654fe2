//! Every module linked into the server registers itself.

use modkit::ModuleRegistry;

#[test]
fn linked_modules_are_discovered_in_dependency_order() {
    // Pull the module crates into this test binary.
    let _ = std::any::type_name::<api_ingress::ApiIngress>();
    let _ = std::any::type_name::<todos::TodosModule>();
    let _ = std::any::type_name::<agenda::AgendaModule>();
    let _ = std::any::type_name::<users::UsersModule>();

    let registry = ModuleRegistry::discover_and_build().expect("registry builds");
    let names: Vec<&str> = registry.modules().iter().map(|m| m.name).collect();

    assert_eq!(names.first(), Some(&"api_ingress"));
    for name in ["todos", "agenda", "users"] {
        assert!(names.contains(&name), "{name} missing from {names:?}");
    }

    let ingress = &registry.modules()[0];
    assert!(ingress.rest_host.is_some() && ingress.stateful.is_some());
    let agenda = registry.modules().iter().find(|m| m.name == "agenda").unwrap();
    assert!(agenda.db.is_some() && agenda.rest.is_some());
    let users = registry.modules().iter().find(|m| m.name == "users").unwrap();
    assert!(users.db.is_none());
}
