//! Derive macros for the managed-settings library
//!
//! This crate provides `#[derive(Settings)]`, which builds the static
//! property table of a struct (its `Managed` implementation) and a typed
//! `<Type>Properties` trait shared by the struct and its settings proxy.
//!
//! # Usage
//!
//! ```rust
//! use managed_settings::{Managed, Settings};
//!
//! #[derive(Settings, Default)]
//! #[settings(name = "app.Window")]
//! pub struct Window {
//!     #[setting(default = 800)]
//!     pub width: i64,
//!
//!     pub title: String,
//! }
//!
//! let width = Window::properties().descriptor("width").unwrap();
//! assert!(width.is_managed());
//! assert_eq!(width.qualified_name(), "app.Window.width");
//! assert_eq!(width.default(), Some(&serde_json::json!(800)));
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Lit, Meta, PathArguments, Type,
    Visibility, parse_macro_input,
};

/// Derive macro for generating `Managed` implementations.
///
/// Every named field becomes a property of the type. Field types must
/// implement `Serialize`, `DeserializeOwned` and `Clone`.
///
/// # Attributes
///
/// ## Container attributes (`#[settings(...)]`)
/// - `name = "a.b.Type"` - Owning type name used in setting keys
///   (default: `module_path!()::Type`)
///
/// ## Field attributes (`#[setting(...)]`)
/// - bare `#[setting]` - Mark the property as managed
/// - `default = <expr>` - Managed, with a default; any Rust expression
///   accepted by `serde_json::json!` (use `json!({ .. })` for object literals)
/// - `type = "integer"` - Override the inferred value type
/// - `sealed` - Accessors cannot be substituted (fails proxy validation)
/// - `skip` - Leave the field out of the property table
///
/// # Empty stores
///
/// Before anything is saved, a managed property reads as its default. With
/// no default, `bool`, integer and float fields read as `false`/`0`/`0.0`
/// and `Option<_>` fields read as `None`. Any other managed field needs a
/// `default`:
///
/// ```compile_fail
/// use managed_settings::Settings;
///
/// #[derive(Settings, Default)]
/// pub struct Window {
///     #[setting]
///     pub title: String,
/// }
/// ```
#[proc_macro_derive(Settings, attributes(settings, setting))]
pub fn derive_settings(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Settings cannot be derived for generic types.\n\nEach settings type needs one static property table.",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Settings can only be derived for structs with named fields.\n\nExample:\n  #[derive(Settings)]\n  struct MySettings {\n      field: Type,\n  }",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Settings can only be derived for structs.\n\nTry: #[derive(Settings)] on a struct, not an enum or union.",
            ));
        }
    };

    let container = parse_container_attrs(&input.attrs)?;
    let type_name = match container.name {
        Some(custom) => quote! { #custom },
        None => quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#name)) },
    };

    let mut accessor_fns = Vec::new();
    let mut properties = Vec::new();
    let mut trait_methods = Vec::new();
    let mut plain_impls = Vec::new();
    let mut proxy_impls = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let ty = &field.ty;
        let property = ident.unraw().to_string();
        let read_fn = format_ident!("__read_{}", property);
        let write_fn = format_ident!("__write_{}", property);

        accessor_fns.push(quote! {
            fn #read_fn(target: &#name) -> ::managed_settings::Result<__json::Value> {
                ::core::result::Result::Ok(__json::to_value(&target.#ident)?)
            }

            fn #write_fn(target: &mut #name, value: __json::Value) -> ::managed_settings::Result<()> {
                target.#ident = __json::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        });

        let type_name = attrs
            .value_type
            .clone()
            .unwrap_or_else(|| infer_value_type(ty).to_string());
        let value_type = value_type_tokens(&type_name).ok_or_else(|| {
            syn::Error::new_spanned(
                &field.ty,
                format!(
                    "Unknown setting type \"{type_name}\".\n\nExpected one of: any, bool, integer, float, string, list, object"
                ),
            )
        })?;

        // An empty store reads as the default, the zero value or null
        let nullable = accepts_null(ty);
        let has_zero = matches!(type_name.as_str(), "bool" | "integer" | "float");
        if attrs.managed && attrs.default.is_none() && !nullable && !has_zero {
            return Err(syn::Error::new_spanned(
                field,
                format!(
                    "Managed setting `{property}` has no value to read before one is saved.\n\nAdd a default or make the field optional:\n  #[setting(default = ...)]\n  {property}: {ty_text},\n\n  #[setting]\n  {property}: Option<{ty_text}>,",
                    ty_text = quote!(#ty).to_string().replace(' ', ""),
                ),
            ));
        }

        let mut modifiers = Vec::new();
        if attrs.managed {
            modifiers.push(quote! { .managed() });
        }
        if nullable {
            modifiers.push(quote! { .nullable() });
        }
        if let Some(default) = &attrs.default {
            modifiers.push(quote! { .default_value(__json::json!(#default)) });
        }
        let visibility = visibility_tokens(&field.vis);
        modifiers.push(quote! { .visibility(#visibility) });
        if attrs.sealed {
            modifiers.push(quote! { .sealed() });
        }

        properties.push(quote! {
            .property(#property, #value_type)
            #(#modifiers)*
            .read(#read_fn)
            .write(#write_fn)
            .finish()
        });

        // Only public fields are part of the shared interface
        if matches!(field.vis, Visibility::Public(_)) {
            let setter = format_ident!("set_{}", property);
            let doc = format!("Value of `{property}`");
            trait_methods.push(quote! {
                #[doc = #doc]
                fn #ident(&self) -> ::managed_settings::Result<#ty>;
                fn #setter(&mut self, value: #ty) -> ::managed_settings::Result<()>;
            });
            plain_impls.push(quote! {
                fn #ident(&self) -> ::managed_settings::Result<#ty> {
                    ::core::result::Result::Ok(::core::clone::Clone::clone(&self.#ident))
                }
                fn #setter(&mut self, value: #ty) -> ::managed_settings::Result<()> {
                    self.#ident = value;
                    ::core::result::Result::Ok(())
                }
            });
            proxy_impls.push(quote! {
                fn #ident(&self) -> ::managed_settings::Result<#ty> {
                    self.get_as(#property)
                }
                fn #setter(&mut self, value: #ty) -> ::managed_settings::Result<()> {
                    self.set_as(#property, &value)
                }
            });
        }
    }

    let properties_trait = format_ident!("{}Properties", name);
    let trait_doc = format!("Typed properties of [`{name}`], shared with its settings proxy");

    Ok(quote! {
        impl ::managed_settings::Managed for #name {
            fn properties() -> &'static ::managed_settings::PropertyTable<Self> {
                use ::managed_settings::__private::serde_json as __json;

                static TABLE: ::std::sync::OnceLock<::managed_settings::PropertyTable<#name>> =
                    ::std::sync::OnceLock::new();

                #(#accessor_fns)*

                TABLE.get_or_init(|| {
                    ::managed_settings::PropertyTable::<#name>::builder(#type_name)
                        #(#properties)*
                        .build()
                })
            }
        }

        #[doc = #trait_doc]
        #vis trait #properties_trait {
            #(#trait_methods)*
        }

        impl #properties_trait for #name {
            #(#plain_impls)*
        }

        impl #properties_trait for ::managed_settings::SettingsProxy<#name> {
            #(#proxy_impls)*
        }
    })
}

/// Container-level attributes from #[settings(...)]
#[derive(Default)]
struct ContainerAttrs {
    name: Option<String>,
}

/// Field-level attributes from #[setting(...)]
#[derive(Default)]
struct FieldAttrs {
    managed: bool,
    default: Option<Expr>,
    value_type: Option<String>,
    sealed: bool,
    skip: bool,
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("settings") {
            continue;
        }
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    result.name = Some(string_literal(&nv.value, "#[settings(name = \"a.b.Type\")]")?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "Unknown settings attribute.\n\nSupported: #[settings(name = \"a.b.Type\")]",
                    ));
                }
            }
        }
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("setting") {
            continue;
        }
        result.managed = true;

        // Bare #[setting]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            match meta {
                Meta::Path(path) if path.is_ident("sealed") => result.sealed = true,
                Meta::Path(path) if path.is_ident("skip") => result.skip = true,
                Meta::NameValue(nv) if nv.path.is_ident("default") => {
                    result.default = Some(nv.value);
                }
                Meta::NameValue(nv) if nv.path.is_ident("type") => {
                    result.value_type =
                        Some(string_literal(&nv.value, "#[setting(type = \"integer\")]")?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "Unknown setting attribute.\n\nSupported: default = <expr>, type = \"<type>\", sealed, skip",
                    ));
                }
            }
        }
    }

    Ok(result)
}

fn string_literal(value: &Expr, example: &str) -> syn::Result<String> {
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(
        value,
        format!("Expected a string literal.\n\nExample: {example}"),
    ))
}

fn value_type_tokens(name: &str) -> Option<TokenStream2> {
    let variant = match name {
        "any" => quote! { Any },
        "bool" => quote! { Bool },
        "integer" => quote! { Integer },
        "float" => quote! { Float },
        "string" => quote! { String },
        "list" => quote! { List },
        "object" => quote! { Object },
        _ => return None,
    };
    Some(quote! { ::managed_settings::ValueType::#variant })
}

fn visibility_tokens(vis: &Visibility) -> TokenStream2 {
    match vis {
        Visibility::Public(_) => quote! { ::managed_settings::Visibility::Public },
        Visibility::Restricted(_) => quote! { ::managed_settings::Visibility::Crate },
        Visibility::Inherited => quote! { ::managed_settings::Visibility::Private },
    }
}

/// Map a Rust field type to the name of its declared value type
fn infer_value_type(ty: &Type) -> &'static str {
    let name = match ty {
        Type::Array(_) | Type::Slice(_) | Type::Tuple(_) => "list",
        Type::Paren(inner) => return infer_value_type(&inner.elem),
        Type::Group(inner) => return infer_value_type(&inner.elem),
        Type::Path(path) => match path.path.segments.last() {
            Some(segment) => match segment.ident.to_string().as_str() {
                // Wrappers take the type of their content
                "Option" | "Box" | "Arc" | "Rc" => match first_type_argument(&segment.arguments) {
                    Some(inner) => return infer_value_type(inner),
                    None => "any",
                },
                "bool" => "bool",
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
                | "u64" | "u128" | "usize" => "integer",
                "f32" | "f64" => "float",
                "String" | "char" | "str" | "PathBuf" => "string",
                "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" => "list",
                "HashMap" | "BTreeMap" | "Map" => "object",
                _ => "any",
            },
            None => "any",
        },
        _ => "any",
    };
    name
}

/// Whether `null` deserializes into the field type
fn accepts_null(ty: &Type) -> bool {
    match ty {
        Type::Tuple(tuple) => tuple.elems.is_empty(),
        Type::Paren(inner) => accepts_null(&inner.elem),
        Type::Group(inner) => accepts_null(&inner.elem),
        Type::Path(path) => match path.path.segments.last() {
            Some(segment) => match segment.ident.to_string().as_str() {
                "Option" | "Value" => true,
                "Box" | "Arc" | "Rc" => {
                    first_type_argument(&segment.arguments).is_some_and(accepts_null)
                }
                _ => false,
            },
            None => false,
        },
        _ => false,
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}
