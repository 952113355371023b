//! Java types shared by the integration tests.

use qute::hir::{
    DataModelProject, JavaMethodInfo, JavaTypeKind, MethodValueResolver, ResolvedJavaTypeInfo,
    TemplateDataAnnotation, ValueResolver, ValueResolverKind,
};

use super::FakeJavaProvider;

pub const ITEM: &str = "org.acme.Item";

/// `org.acme.Item { String name; int getAge(); BigDecimal discount(int percent) }`
pub fn item() -> ResolvedJavaTypeInfo {
    ResolvedJavaTypeInfo::new(ITEM)
        .with_field("name", "java.lang.String")
        .with_method(JavaMethodInfo::new("getAge", "int"))
        .with_method(JavaMethodInfo::new("discount", "java.math.BigDecimal").with_parameter("percent", "int"))
}

pub fn list() -> ResolvedJavaTypeInfo {
    ResolvedJavaTypeInfo::new("java.util.List")
        .with_iterable_of("E")
        .with_method(JavaMethodInfo::new("size", "int"))
        .binary()
}

pub fn string() -> ResolvedJavaTypeInfo {
    ResolvedJavaTypeInfo::new("java.lang.String")
        .with_method(JavaMethodInfo::new("isEmpty", "boolean"))
        .binary()
}

pub fn color() -> ResolvedJavaTypeInfo {
    ResolvedJavaTypeInfo::new("org.acme.Color")
        .with_kind(JavaTypeKind::Enum)
        .with_field("RED", "org.acme.Color")
        .with_field("GREEN", "org.acme.Color")
        .with_field("BLUE", "org.acme.Color")
}

/// `Item` hiding `getAge` from native templates.
pub fn item_ignoring_age() -> ResolvedJavaTypeInfo {
    item().with_template_data(TemplateDataAnnotation {
        ignore: vec!["getAge".into()],
        ..TemplateDataAnnotation::default()
    })
}

/// `@TemplateData` subtype of the unannotated `Item`.
pub fn special_item() -> ResolvedJavaTypeInfo {
    ResolvedJavaTypeInfo::new("org.acme.SpecialItem")
        .with_field("badge", "java.lang.String")
        .with_extended_type(ITEM)
        .with_template_data(TemplateDataAnnotation::default())
}

/// Template extensions on `Item`: one with a single user parameter and
/// one with two.
pub fn item_extensions() -> DataModelProject {
    let extension = |method: JavaMethodInfo| {
        ValueResolver::Method(
            MethodValueResolver::new(method, "org.acme.ItemExtensions").with_kind(ValueResolverKind::TemplateExtension),
        )
    };
    DataModelProject::default()
        .with_resolver(extension(
            JavaMethodInfo::new("discountedPrice", "java.math.BigDecimal")
                .with_parameter("item", ITEM)
                .with_parameter("percent", "int"),
        ))
        .with_resolver(extension(
            JavaMethodInfo::new("between", "boolean")
                .with_parameter("item", ITEM)
                .with_parameter("low", "int")
                .with_parameter("high", "int"),
        ))
}

/// Provider knowing `Item`, `List`, `String` and `Color`.
pub fn provider() -> FakeJavaProvider {
    FakeJavaProvider::new()
        .with_type(item())
        .with_type(list())
        .with_type(string())
        .with_type(color())
}
