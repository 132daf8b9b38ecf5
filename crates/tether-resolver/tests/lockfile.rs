use tempfile::TempDir;
use tether_core::lockfile::{Lockfile, Source};
use tether_resolver::lock::{from_resolution, preferred_versions};
use tether_resolver::{MemoryRegistry, Resolver, SemanticVersion, VersionConstraint};

fn v(s: &str) -> SemanticVersion {
    SemanticVersion::parse(s).unwrap()
}

fn c(s: &str) -> VersionConstraint {
    VersionConstraint::parse(s).unwrap()
}

fn registry() -> MemoryRegistry {
    let mut reg = MemoryRegistry::new("https://registry.example");
    reg.publish("foo", v("1.0.0"), vec![]);
    reg.publish("foo", v("1.2.0"), vec![]);
    reg.publish("foo", v("1.2.5"), vec![("bar".into(), c("~2.1.0"))]);
    for ver in ["2.0.0", "2.1.0", "2.1.3", "2.2.0"] {
        reg.publish("bar", v(ver), vec![]);
    }
    reg.set_integrity("foo", &v("1.2.5"), "sha256-f00");
    reg.set_source(
        "bar",
        &v("2.1.3"),
        Source::Git {
            url: "https://git.example/bar".into(),
            commit: "b4r".into(),
        },
    );
    reg
}

fn lock(reg: &MemoryRegistry) -> Lockfile {
    let mut resolver = Resolver::new().with_root("app");
    resolver.add_dependency("app", "foo", c("^1.0.0"));
    let resolution = resolver.resolve(reg).unwrap();
    from_resolution(&resolution, reg, Some("manifest-digest".into())).unwrap()
}

#[test]
fn serialize_deserialize_serialize_is_stable() {
    let text = lock(&registry()).serialize().unwrap();
    let again = Lockfile::deserialize(&text).unwrap().serialize().unwrap();
    assert_eq!(text, again);
}

#[test]
fn re_resolution_is_byte_identical() {
    let reg = registry();
    let first = lock(&reg).serialize().unwrap();
    let second = lock(&reg).serialize().unwrap();
    assert_eq!(first, second);
}

#[test]
fn lockfile_contents_follow_registry_metadata() {
    let lockfile = lock(&registry());
    let foo = lockfile.find("foo").unwrap();
    assert_eq!(foo.version, "1.2.5");
    assert_eq!(foo.resolved, "foo@1.2.5");
    assert_eq!(foo.integrity.as_deref(), Some("sha256-f00"));
    assert_eq!(foo.dependencies.get("bar").map(String::as_str), Some("2.1.3"));

    let bar = lockfile.find("bar").unwrap();
    assert_eq!(bar.resolved, "https://git.example/bar#b4r");
    assert!(matches!(bar.source, Source::Git { ref commit, .. } if commit == "b4r"));
}

#[test]
fn saved_lockfile_pins_a_later_resolution() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Tether.lock");
    let mut reg = registry();
    lock(&reg).save(&path).unwrap();

    // A newer compatible bar appears; the locked one is still preferred.
    reg.publish("bar", v("2.1.9"), vec![]);
    let locked = preferred_versions(&Lockfile::load(&path).unwrap()).unwrap();
    let mut resolver = Resolver::new().with_root("app").prefer(locked);
    resolver.add_dependency("app", "foo", c("^1.0.0"));
    let resolution = resolver.resolve(&reg).unwrap();
    assert_eq!(resolution.get("bar").unwrap().version, v("2.1.3"));

    // Without preferences the greedy rule takes the newest.
    let mut fresh = Resolver::new().with_root("app");
    fresh.add_dependency("app", "foo", c("^1.0.0"));
    assert_eq!(fresh.resolve(&reg).unwrap().get("bar").unwrap().version, v("2.1.9"));
}
