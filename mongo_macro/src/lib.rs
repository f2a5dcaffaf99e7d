extern crate proc_macro;

mod mongo_index_macro;
mod mongo_query_macro;

use proc_macro::TokenStream;

/// `#[mongo(collection = "...")]` + 任意个 `#[mongo_index(fields["a", "b"], unique, order("desc"), name("..."))]`
#[proc_macro_derive(MongoIndexModelProvider, attributes(mongo, mongo_index))]
pub fn mongo_index_model_provider(input: TokenStream) -> TokenStream {
    mongo_index_macro::expand_index_model_provider(input)
}

/// 查询 DTO 上的 `#[query(eq | ne | gt | lt | like | eq_ignore_case, field = "...")]`
#[proc_macro_derive(QueryFilter, attributes(query))]
pub fn derive_query_filter(input: TokenStream) -> TokenStream {
    mongo_query_macro::derive_query_filter(input)
}
