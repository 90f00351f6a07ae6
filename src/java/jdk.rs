//! Built-in declarations for the platform types user code leans on.
//!
//! Only the shape matters: type parameters and supertypes, so that
//! `ArrayList<User>` can be traced to `Iterable<User>`. No fields are listed;
//! everything here lives under an opaque prefix anyway.
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::types::{DeclKind, TypeDecl, TypeRef};

type Super = (&'static str, &'static [&'static str]);

struct Entry {
    name: &'static str,
    kind: DeclKind,
    params: &'static [&'static str],
    extends: Option<Super>,
    implements: &'static [Super],
}

const fn class(name: &'static str, params: &'static [&'static str], extends: Option<Super>, implements: &'static [Super]) -> Entry {
    Entry { name, kind: DeclKind::Class, params, extends, implements }
}

const fn interface(name: &'static str, params: &'static [&'static str], implements: &'static [Super]) -> Entry {
    Entry { name, kind: DeclKind::Interface, params, extends: None, implements }
}

const E: &[&str] = &["E"];
const KV: &[&str] = &["K", "V"];
const NUMBER: Option<Super> = Some(("java.lang.Number", &[]));

static ENTRIES: &[Entry] = &[
    // java.lang
    class("java.lang.Object", &[], None, &[]),
    interface("java.lang.CharSequence", &[], &[]),
    interface("java.lang.Comparable", &["T"], &[]),
    interface("java.lang.Iterable", &["T"], &[]),
    class("java.lang.String", &[], None, &[("java.lang.CharSequence", &[])]),
    class("java.lang.Number", &[], None, &[]),
    class("java.lang.Boolean", &[], None, &[]),
    class("java.lang.Character", &[], None, &[]),
    class("java.lang.Byte", &[], NUMBER, &[]),
    class("java.lang.Short", &[], NUMBER, &[]),
    class("java.lang.Integer", &[], NUMBER, &[]),
    class("java.lang.Long", &[], NUMBER, &[]),
    class("java.lang.Float", &[], NUMBER, &[]),
    class("java.lang.Double", &[], NUMBER, &[]),
    class("java.lang.Void", &[], None, &[]),
    // java.math
    class("java.math.BigDecimal", &[], NUMBER, &[]),
    class("java.math.BigInteger", &[], NUMBER, &[]),
    // java.util collections
    interface("java.util.Collection", E, &[("java.lang.Iterable", E)]),
    interface("java.util.List", E, &[("java.util.Collection", E)]),
    interface("java.util.Set", E, &[("java.util.Collection", E)]),
    interface("java.util.SortedSet", E, &[("java.util.Set", E)]),
    interface("java.util.NavigableSet", E, &[("java.util.SortedSet", E)]),
    interface("java.util.Queue", E, &[("java.util.Collection", E)]),
    interface("java.util.Deque", E, &[("java.util.Queue", E)]),
    class("java.util.AbstractCollection", E, None, &[("java.util.Collection", E)]),
    class("java.util.AbstractList", E, Some(("java.util.AbstractCollection", E)), &[("java.util.List", E)]),
    class("java.util.ArrayList", E, None, &[("java.util.List", E)]),
    class("java.util.LinkedList", E, None, &[("java.util.List", E), ("java.util.Deque", E)]),
    class("java.util.Vector", E, Some(("java.util.AbstractList", E)), &[("java.util.List", E)]),
    class("java.util.Stack", E, Some(("java.util.Vector", E)), &[]),
    class("java.util.HashSet", E, None, &[("java.util.Set", E)]),
    class("java.util.LinkedHashSet", E, Some(("java.util.HashSet", E)), &[("java.util.Set", E)]),
    class("java.util.TreeSet", E, None, &[("java.util.NavigableSet", E)]),
    class("java.util.EnumSet", E, None, &[("java.util.Set", E)]),
    class("java.util.ArrayDeque", E, None, &[("java.util.Deque", E)]),
    class("java.util.PriorityQueue", E, None, &[("java.util.Queue", E)]),
    interface("java.util.Iterator", E, &[]),
    interface("java.util.Map", KV, &[]),
    interface("java.util.SortedMap", KV, &[("java.util.Map", KV)]),
    interface("java.util.NavigableMap", KV, &[("java.util.SortedMap", KV)]),
    class("java.util.HashMap", KV, None, &[("java.util.Map", KV)]),
    class("java.util.LinkedHashMap", KV, Some(("java.util.HashMap", KV)), &[("java.util.Map", KV)]),
    class("java.util.TreeMap", KV, None, &[("java.util.NavigableMap", KV)]),
    class("java.util.Hashtable", KV, None, &[("java.util.Map", KV)]),
    class("java.util.EnumMap", KV, None, &[("java.util.Map", KV)]),
    class("java.util.IdentityHashMap", KV, None, &[("java.util.Map", KV)]),
    class("java.util.WeakHashMap", KV, None, &[("java.util.Map", KV)]),
    class("java.util.Optional", &["T"], None, &[]),
    class("java.util.Date", &[], None, &[]),
    class("java.util.Calendar", &[], None, &[]),
    class("java.util.UUID", &[], None, &[]),
    class("java.util.Locale", &[], None, &[]),
    class("java.util.Currency", &[], None, &[]),
    // java.util.concurrent
    interface("java.util.concurrent.BlockingQueue", E, &[("java.util.Queue", E)]),
    interface("java.util.concurrent.BlockingDeque", E, &[("java.util.concurrent.BlockingQueue", E), ("java.util.Deque", E)]),
    class("java.util.concurrent.CopyOnWriteArrayList", E, None, &[("java.util.List", E)]),
    class("java.util.concurrent.CopyOnWriteArraySet", E, None, &[("java.util.Set", E)]),
    class("java.util.concurrent.ConcurrentLinkedQueue", E, None, &[("java.util.Queue", E)]),
    class("java.util.concurrent.ConcurrentLinkedDeque", E, None, &[("java.util.Deque", E)]),
    class("java.util.concurrent.ConcurrentSkipListSet", E, None, &[("java.util.NavigableSet", E)]),
    class("java.util.concurrent.LinkedBlockingQueue", E, None, &[("java.util.concurrent.BlockingQueue", E)]),
    class("java.util.concurrent.ArrayBlockingQueue", E, None, &[("java.util.concurrent.BlockingQueue", E)]),
    class("java.util.concurrent.LinkedBlockingDeque", E, None, &[("java.util.concurrent.BlockingDeque", E)]),
    class("java.util.concurrent.PriorityBlockingQueue", E, None, &[("java.util.concurrent.BlockingQueue", E)]),
    interface("java.util.concurrent.ConcurrentMap", KV, &[("java.util.Map", KV)]),
    class("java.util.concurrent.ConcurrentHashMap", KV, None, &[("java.util.concurrent.ConcurrentMap", KV)]),
    class("java.util.concurrent.ConcurrentSkipListMap", KV, None, &[("java.util.concurrent.ConcurrentMap", KV), ("java.util.NavigableMap", KV)]),
    // java.time / java.sql
    class("java.time.LocalDate", &[], None, &[]),
    class("java.time.LocalTime", &[], None, &[]),
    class("java.time.LocalDateTime", &[], None, &[]),
    class("java.time.Instant", &[], None, &[]),
    class("java.time.ZonedDateTime", &[], None, &[]),
    class("java.time.OffsetDateTime", &[], None, &[]),
    class("java.time.OffsetTime", &[], None, &[]),
    class("java.time.Duration", &[], None, &[]),
    class("java.time.Period", &[], None, &[]),
    class("java.time.Year", &[], None, &[]),
    class("java.time.YearMonth", &[], None, &[]),
    class("java.time.MonthDay", &[], None, &[]),
    class("java.time.ZoneId", &[], None, &[]),
    class("java.time.ZoneOffset", &[], Some(("java.time.ZoneId", &[])), &[]),
    class("java.time.DayOfWeek", &[], None, &[]),
    class("java.time.Month", &[], None, &[]),
    class("java.sql.Timestamp", &[], Some(("java.util.Date", &[])), &[]),
    class("java.sql.Date", &[], Some(("java.util.Date", &[])), &[]),
];

static CATALOG: Lazy<IndexMap<&'static str, TypeDecl>> =
    Lazy::new(|| ENTRIES.iter().map(|entry| (entry.name, entry.to_decl())).collect());

impl Entry {
    fn to_decl(&self) -> TypeDecl {
        let reference = |(name, args): &Super| {
            TypeRef::generic(*name, args.iter().map(|a| TypeRef::param(*a)).collect())
        };
        let mut decl = TypeDecl::new(self.name, self.kind);
        decl.type_params = self.params.iter().map(|p| p.to_string()).collect();
        decl.superclass = self.extends.as_ref().map(reference);
        decl.interfaces = self.implements.iter().map(reference).collect();
        decl
    }
}

pub fn catalog() -> impl Iterator<Item = &'static TypeDecl> {
    CATALOG.values()
}

pub fn lookup(name: &str) -> Option<&'static TypeDecl> {
    CATALOG.get(name)
}

/// First catalog entry with this simple name, in table order
/// (`Date` → `java.util.Date`).
pub fn by_simple_name(simple: &str) -> Option<&'static TypeDecl> {
    CATALOG.values().find(|decl| crate::types::simple_name(&decl.name) == simple)
}

/// Packages whose types can never come from user sources.
pub fn is_platform_package(path: &str) -> bool {
    crate::mock::DEFAULT_OPAQUE_PREFIXES
        .iter()
        .any(|prefix| format!("{path}.").starts_with(prefix))
}

/// `java.lang` types are visible without an import.
pub fn java_lang(simple: &str) -> Option<&'static TypeDecl> {
    lookup(&format!("java.lang.{simple}"))
}
