//! Client-hook library profiles.
//!
//! A profile is a data record: which module exports the query and mutation
//! primitives, what their option types are called, how cache keys are laid
//! out and how cancellation reaches the fetch wrapper. Supporting another
//! library means adding a record here.

use crate::error::{Error, Result};

/// First element of a cache key tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// `"listItems"`
    OperationId,
    /// `"/items/{itemId}"`
    PathTemplate,
}

/// How request parameters follow the prefix in a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyArgs {
    /// The params object itself (structurally hashed by the library)
    Object,
    /// `JSON.stringify(params)` (compared by identity by the library)
    Serialized,
}

/// Layout of the key tuple `[prefix, args]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKeyShape {
    /// First element.
    pub prefix: KeyPrefix,
    /// Trailing element, present when the operation has parameters.
    pub args: KeyArgs,
}

/// How an abort signal is threaded into the generated fetch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalConvention {
    /// The query function receives `{ signal }` and forwards it as `RequestInit`.
    QueryContext,
    /// The library does not cancel requests.
    None,
}

/// Argument layout of the query and mutation primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// `useQuery({ queryKey, queryFn, ...options })`
    OptionsObject,
    /// `useSWR(key, fetcher, options)`
    KeyThenFetcher,
}

/// One client-hook library.
///
/// Option type templates use `{data}` for the response type and `{vars}` for
/// the mutation input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterProfile {
    /// Value accepted by `--profile`.
    pub name: &'static str,
    /// Module exporting `query_primitive`.
    pub query_module: &'static str,
    /// Module exporting `mutation_primitive`.
    pub mutation_module: &'static str,
    /// Hook wrapped by generated queries (`useQuery`).
    pub query_primitive: &'static str,
    /// Hook wrapped by generated mutations (`useMutation`).
    pub mutation_primitive: &'static str,
    /// The primitives are default exports (`import useSWR from "swr"`).
    pub default_exports: bool,
    /// Type of the optional `options` argument on query hooks.
    pub query_options_type: &'static str,
    /// Type of the optional `options` argument on mutation hooks.
    pub mutation_options_type: &'static str,
    /// Type-only imports needed by the option types, with their modules
    pub query_type_imports: &'static [&'static str],
    /// Same as `query_type_imports`, for mutation hooks.
    pub mutation_type_imports: &'static [&'static str],
    /// Generated hook names are `<hook_prefix><Operation>`
    pub hook_prefix: &'static str,
    /// Cache key layout.
    pub cache_key: CacheKeyShape,
    /// Cancellation convention.
    pub signal: SignalConvention,
    /// Argument layout of both primitives.
    pub call_shape: CallShape,
}

/// `@tanstack/react-query`
pub const TANSTACK: EmitterProfile = EmitterProfile {
    name: "tanstack",
    query_module: "@tanstack/react-query",
    mutation_module: "@tanstack/react-query",
    query_primitive: "useQuery",
    mutation_primitive: "useMutation",
    default_exports: false,
    query_options_type: "Omit<UseQueryOptions<{data}, ApiError>, \"queryKey\" | \"queryFn\">",
    mutation_options_type: "Omit<UseMutationOptions<{data}, ApiError, {vars}>, \"mutationFn\">",
    query_type_imports: &["UseQueryOptions"],
    mutation_type_imports: &["UseMutationOptions"],
    hook_prefix: "use",
    cache_key: CacheKeyShape {
        prefix: KeyPrefix::PathTemplate,
        args: KeyArgs::Object,
    },
    signal: SignalConvention::QueryContext,
    call_shape: CallShape::OptionsObject,
};

/// `swr` and `swr/mutation`
pub const SWR: EmitterProfile = EmitterProfile {
    name: "swr",
    query_module: "swr",
    mutation_module: "swr/mutation",
    query_primitive: "useSWR",
    mutation_primitive: "useSWRMutation",
    default_exports: true,
    query_options_type: "SWRConfiguration<{data}, ApiError>",
    mutation_options_type: "SWRMutationConfiguration<{data}, ApiError, string, {vars}>",
    query_type_imports: &["SWRConfiguration"],
    mutation_type_imports: &["SWRMutationConfiguration"],
    hook_prefix: "use",
    cache_key: CacheKeyShape {
        prefix: KeyPrefix::PathTemplate,
        args: KeyArgs::Serialized,
    },
    signal: SignalConvention::None,
    call_shape: CallShape::KeyThenFetcher,
};

/// `@tanstack/vue-query`
pub const VUE_QUERY: EmitterProfile = EmitterProfile {
    name: "vue-query",
    query_module: "@tanstack/vue-query",
    mutation_module: "@tanstack/vue-query",
    query_primitive: "useQuery",
    mutation_primitive: "useMutation",
    default_exports: false,
    query_options_type: "Omit<UseQueryOptions<{data}, ApiError>, \"queryKey\" | \"queryFn\">",
    mutation_options_type: "Omit<UseMutationOptions<{data}, ApiError, {vars}>, \"mutationFn\">",
    query_type_imports: &["UseQueryOptions"],
    mutation_type_imports: &["UseMutationOptions"],
    hook_prefix: "use",
    cache_key: CacheKeyShape {
        prefix: KeyPrefix::OperationId,
        args: KeyArgs::Object,
    },
    signal: SignalConvention::QueryContext,
    call_shape: CallShape::OptionsObject,
};

/// `@tanstack/svelte-query`
pub const SVELTE_QUERY: EmitterProfile = EmitterProfile {
    name: "svelte-query",
    query_module: "@tanstack/svelte-query",
    mutation_module: "@tanstack/svelte-query",
    query_primitive: "createQuery",
    mutation_primitive: "createMutation",
    default_exports: false,
    query_options_type: "Omit<CreateQueryOptions<{data}, ApiError>, \"queryKey\" | \"queryFn\">",
    mutation_options_type: "Omit<CreateMutationOptions<{data}, ApiError, {vars}>, \"mutationFn\">",
    query_type_imports: &["CreateQueryOptions"],
    mutation_type_imports: &["CreateMutationOptions"],
    hook_prefix: "create",
    cache_key: CacheKeyShape {
        prefix: KeyPrefix::OperationId,
        args: KeyArgs::Object,
    },
    signal: SignalConvention::QueryContext,
    call_shape: CallShape::OptionsObject,
};

/// Every built-in profile, in the order the CLI lists them.
pub const PROFILES: [EmitterProfile; 4] = [TANSTACK, SWR, VUE_QUERY, SVELTE_QUERY];

impl EmitterProfile {
    /// Look up a built-in profile by name.
    pub fn by_name(name: &str) -> Result<Self> {
        PROFILES
            .iter()
            .find(|profile| profile.name == name)
            .copied()
            .ok_or_else(|| {
                let known = PROFILES.iter().map(|p| p.name).collect::<Vec<_>>().join(", ");
                Error::InvalidCliArgument(format!("unknown profile '{name}' (expected one of: {known})"))
            })
    }

    pub(crate) fn query_options(&self, data: &str) -> String {
        self.query_options_type.replace("{data}", data)
    }

    pub(crate) fn mutation_options(&self, data: &str, vars: &str) -> String {
        self.mutation_options_type
            .replace("{data}", data)
            .replace("{vars}", vars)
    }
}

impl std::str::FromStr for EmitterProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::by_name(s)
    }
}
