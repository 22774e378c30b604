use proc_macro::TokenStream;
use quote::quote;
use syn::*;

macro_rules! error {
    ($($tt:tt)*) => {
        return Err(syn::Error::new(proc_macro2::Span::call_site(), format!($($tt)*)))
    };
}

#[derive(Default)]
struct FieldAttr {
    primary_key: bool,
    auto_increment: bool,
    not_null: bool,
    unique: bool,
    length: usize,
    name: Option<String>,
}

impl FieldAttr {
    fn from_field(field: &Field) -> Result<Self> {
        let mut attr = FieldAttr::default();
        for a in field.attrs.iter().filter(|a| a.path().is_ident("sql")) {
            a.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    attr.primary_key = true;
                } else if meta.path.is_ident("auto_increment") {
                    attr.auto_increment = true;
                } else if meta.path.is_ident("not_null") {
                    attr.not_null = true;
                } else if meta.path.is_ident("unique") {
                    attr.unique = true;
                } else if meta.path.is_ident("length") {
                    attr.length = meta.value()?.parse::<LitInt>()?.base10_parse()?;
                } else if meta.path.is_ident("name") {
                    attr.name = Some(meta.value()?.parse::<LitStr>()?.value());
                } else {
                    return Err(meta.error(
                        "expected `primary_key`, `auto_increment`, `not_null`, \
                         `unique`, `length = N` or `name = \"..\"`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(attr)
    }
}

pub fn entity(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput { attrs, vis: _, ident, generics, data } = input;
    let Data::Struct(data) = data else {
        error!("only struct are supported")
    };
    let Fields::Named(FieldsNamed { named, .. }) = data.fields else {
        error!("only named struct are supported")
    };

    let table = attrs
        .iter()
        .find(|e| e.path().is_ident("sql"))
        .map(|e| Ok::<_, Error>(e.parse_args::<LitStr>()?.value()))
        .unwrap_or_else(|| Ok(to_snake_case(&ident.to_string())))?;

    let opts = named
        .iter()
        .map(FieldAttr::from_field)
        .collect::<Result<Vec<_>>>()?;

    let names = named
        .iter()
        .zip(&opts)
        .map(|(field, opt)| {
            let ident = field.ident.as_ref().expect("named struct field");
            opt.name.clone().unwrap_or_else(|| column_name(&ident.to_string()))
        })
        .collect::<Vec<_>>();

    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            error!("two fields resolve to the column name `{name}`")
        }
    }

    let specs = named.iter().zip(&opts).zip(&names).map(|((field, opt), name)| {
        let ty = &field.ty;
        let length = opt.length;
        let unique = opt.unique;
        let auto_increment = opt.auto_increment;
        let nullable = match opt.not_null || opt.auto_increment {
            true => quote! { false },
            false => quote! { <#ty as ::shark::FieldType>::NULLABLE },
        };
        quote! {
            ::shark::FieldSpec {
                name: #name,
                ty: <#ty as ::shark::FieldType>::TYPE,
                length: #length,
                nullable: #nullable,
                unique: #unique,
                auto_increment: #auto_increment,
                default_value: "",
            },
        }
    });

    let primary_keys = opts
        .iter()
        .zip(&names)
        .filter(|(opt, _)| opt.primary_key)
        .map(|(_, name)| name.clone())
        .collect::<Vec<_>>();

    let value_arms = named.iter().enumerate().map(|(index, field)| {
        let ident = field.ident.as_ref().expect("named struct field");
        quote! { #index => ::shark::FieldType::to_value(&self.#ident), }
    });

    let apply_arms = named.iter().enumerate().map(|(index, field)| {
        let ident = field.ident.as_ref().expect("named struct field");
        quote! { #index => self.#ident = ::shark::FieldType::from_value(value)?, }
    });

    let (g1, g2, g3) = generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #g1 ::shark::Entity for #ident #g2 #g3 {
            fn table_name(&self) -> &'static str {
                #table
            }

            fn fields() -> &'static [::shark::FieldSpec] {
                const FIELDS: &[::shark::FieldSpec] = &[#(#specs)*];
                FIELDS
            }

            fn primary_keys() -> &'static [&'static str] {
                &[#(#primary_keys),*]
            }

            fn value(&self, field: usize) -> ::shark::Value {
                match field {
                    #(#value_arms)*
                    _ => ::shark::Value::Null,
                }
            }

            fn apply(
                &mut self,
                field: usize,
                value: &::shark::Value,
            ) -> ::std::result::Result<(), ::shark::TypeMismatch> {
                match field {
                    #(#apply_arms)*
                    _ => { }
                }
                Ok(())
            }
        }
    }
    .into())
}

/// Column name resolution: every uppercase ascii letter becomes `_`
/// followed by its lowercase form, in one pass.
fn column_name(ident: &str) -> String {
    let mut output = String::with_capacity(ident.len());
    for it in ident.chars() {
        if it.is_ascii_uppercase() {
            output.push('_');
            output.extend(it.to_lowercase());
        } else {
            output.push(it);
        }
    }
    output
}

/// Default table name from a type identifier.
pub fn to_snake_case(string: &str) -> String {
    if string.is_empty() {
        return String::new();
    }

    let mut output = String::with_capacity(string.len());

    let mut iter = string.chars();
    let Some(lead) = iter.next() else {
        unreachable!()
    };

    output.extend(lead.to_lowercase());

    for it in iter {
        if it.is_uppercase() {
            output.push('_');
            output.extend(it.to_lowercase());
        } else {
            output.push(it);
        }
    }

    output
}
