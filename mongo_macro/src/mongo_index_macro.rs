use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, DeriveInput, LitStr, Token};

struct IndexSpec {
    fields: Vec<String>,
    unique: bool,
    sort_order: i32,
    name: Option<String>,
}

pub fn expand_index_model_provider(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match expand(&ast) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &ast.ident;
    let mut collection: Option<String> = None;
    let mut specs = vec![];

    for attr in &ast.attrs {
        if attr.path().is_ident("mongo") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    let value: LitStr = meta.value()?.parse()?;
                    collection = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `collection = \"...\"`"))
                }
            })?;
        } else if attr.path().is_ident("mongo_index") {
            specs.push(parse_index(attr)?);
        }
    }

    let collection = collection.ok_or_else(|| {
        syn::Error::new_spanned(name, "missing #[mongo(collection = \"...\")] on MongoIndexModelProvider")
    })?;

    let models = specs.iter().map(|spec| {
        let keys = spec.fields.iter().map(|field| {
            let order = spec.sort_order;
            quote! { keys.insert(#field, #order); }
        });
        let index_name = spec.name.clone().unwrap_or_else(|| {
            spec.fields.iter().map(|f| format!("{}_{}", f, spec.sort_order)).collect::<Vec<_>>().join("_")
        });
        let unique = spec.unique;
        quote! {
            {
                let mut keys = ::mongodb::bson::Document::new();
                #(#keys)*
                ::mongodb::IndexModel::builder()
                    .keys(keys)
                    .options(Some(
                        ::mongodb::options::IndexOptions::builder()
                            .unique(#unique)
                            .name(#index_name.to_string())
                            .build(),
                    ))
                    .build()
            }
        }
    });

    Ok(quote! {
        impl ::common::index_trait::MongoIndexModelProvider for #name {
            fn collection_name() -> &'static str {
                #collection
            }

            fn index_models() -> Vec<::mongodb::IndexModel> {
                vec![
                    #(#models),*
                ]
            }
        }
    })
}

fn parse_index(attr: &syn::Attribute) -> syn::Result<IndexSpec> {
    let mut spec = IndexSpec { fields: vec![], unique: false, sort_order: 1, name: None };
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("fields") {
            let content;
            syn::bracketed!(content in meta.input);
            let fields = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
            spec.fields.extend(fields.iter().map(LitStr::value));
        } else if meta.path.is_ident("unique") {
            spec.unique = true;
        } else if meta.path.is_ident("order") {
            let content;
            syn::parenthesized!(content in meta.input);
            let lit: LitStr = content.parse()?;
            if lit.value().eq_ignore_ascii_case("desc") {
                spec.sort_order = -1;
            }
        } else if meta.path.is_ident("name") {
            let content;
            syn::parenthesized!(content in meta.input);
            let lit: LitStr = content.parse()?;
            spec.name = Some(lit.value());
        } else {
            return Err(meta.error("unsupported #[mongo_index(...)] option"));
        }
        Ok(())
    })?;
    if spec.fields.is_empty() {
        return Err(syn::Error::new_spanned(attr, "#[mongo_index] needs fields[\"...\"]"));
    }
    Ok(spec)
}
