use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

enum QueryOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Like,
    EqIgnoreCase,
}

pub fn derive_query_filter(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let struct_name = input.ident;
    let mut field_handlers = vec![];

    let syn::Data::Struct(data) = input.data else {
        return syn::Error::new_spanned(struct_name, "QueryFilter can only be derived for structs")
            .to_compile_error()
            .into();
    };

    for field in data.fields {
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };

        let mut rename = field_ident.to_string();
        let mut query_ops = Vec::new();

        // 解析所有 #[query(...)] 属性
        for attr in &field.attrs {
            if !attr.path().is_ident("query") {
                continue;
            }

            let res = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("eq") {
                    query_ops.push(QueryOp::Eq);
                } else if meta.path.is_ident("ne") {
                    query_ops.push(QueryOp::Ne);
                } else if meta.path.is_ident("gt") {
                    query_ops.push(QueryOp::Gt);
                } else if meta.path.is_ident("lt") {
                    query_ops.push(QueryOp::Lt);
                } else if meta.path.is_ident("like") {
                    query_ops.push(QueryOp::Like);
                } else if meta.path.is_ident("eq_ignore_case") {
                    query_ops.push(QueryOp::EqIgnoreCase);
                } else if meta.path.is_ident("field") {
                    let val: syn::LitStr = meta.value()?.parse()?;
                    rename = val.value();
                } else {
                    return Err(meta.error("Unsupported #[query(...)] attribute"));
                }
                Ok(())
            });

            if let Err(e) = res {
                return e.to_compile_error().into();
            }
        }

        // 生成每个操作对应的匹配逻辑；空值与 `all` 由 filter_bson 过滤
        for op in query_ops {
            let apply = match op {
                QueryOp::Eq => quote! { builder = builder.eq(#rename, val); },
                QueryOp::Ne => quote! { builder = builder.ne(#rename, val); },
                QueryOp::Gt => quote! { builder = builder.merge(::mongodb::bson::doc! { #rename: { "$gt": val } }); },
                QueryOp::Lt => quote! { builder = builder.merge(::mongodb::bson::doc! { #rename: { "$lt": val } }); },
                QueryOp::Like => quote! {
                    if let ::mongodb::bson::Bson::String(text) = &val {
                        builder = builder.like(#rename, text);
                    }
                },
                QueryOp::EqIgnoreCase => quote! {
                    if let ::mongodb::bson::Bson::String(text) = &val {
                        builder = builder.eq_ignore_case(#rename, text);
                    }
                },
            };
            field_handlers.push(quote! {
                if let Some(val) = self.#field_ident.as_ref().and_then(::common::query_builder::filter_bson) {
                    #apply
                }
            });
        }
    }

    let expanded = quote! {
        impl #struct_name {
            pub fn to_query_doc(&self) -> ::mongodb::bson::Document {
                self.query_builder().build()
            }

            pub fn query_builder(&self) -> ::common::query_builder::QueryBuilder {
                let mut builder = ::common::query_builder::QueryBuilder::new();
                #(#field_handlers)*
                builder
            }
        }
    };

    expanded.into()
}
