//! Declarative description of one API call.

use std::borrow::Cow;

use crate::builder::RequestBuilder;
use crate::error::BuildError;
use crate::http::{Headers, HttpMethod, HttpRequest};
use crate::params::RequestParameters;

/// One logical API call: where it goes, how, and with what.
///
/// Implemented by caller types, usually an enum with a variant per call:
///
/// ```
/// use std::borrow::Cow;
/// use netkit_core::{Endpoint, HttpMethod, Parameters, RequestParameters};
///
/// enum RickAndMorty {
///     Characters { page: u32 },
///     Episodes,
/// }
///
/// impl Endpoint for RickAndMorty {
///     fn base_url(&self) -> Cow<'_, str> {
///         Cow::Borrowed("https://rickandmortyapi.com/api")
///     }
///
///     fn path(&self) -> Cow<'_, str> {
///         match self {
///             RickAndMorty::Characters { .. } => "/character".into(),
///             RickAndMorty::Episodes => "/episode".into(),
///         }
///     }
///
///     fn method(&self) -> HttpMethod {
///         HttpMethod::Get
///     }
///
///     fn parameters(&self) -> Option<RequestParameters> {
///         match self {
///             RickAndMorty::Characters { page } => {
///                 Some(RequestParameters::Query(Parameters::new().with("page", *page)))
///             }
///             RickAndMorty::Episodes => None,
///         }
///     }
/// }
///
/// let request = RickAndMorty::Characters { page: 2 }.request().unwrap();
/// assert_eq!(
///     request.url.as_str(),
///     "https://rickandmortyapi.com/api/character?page=2"
/// );
/// ```
pub trait Endpoint {
    fn base_url(&self) -> Cow<'_, str>;

    fn path(&self) -> Cow<'_, str>;

    fn method(&self) -> HttpMethod;

    /// Endpoint-specific headers, merged over the builder's defaults.
    fn headers(&self) -> Headers {
        Headers::new()
    }

    fn parameters(&self) -> Option<RequestParameters> {
        None
    }

    /// Build the wire request with the default JSON headers.
    fn request(&self) -> Result<HttpRequest, BuildError> {
        RequestBuilder::default().build(self)
    }
}

impl<E: Endpoint + ?Sized> Endpoint for &E {
    fn base_url(&self) -> Cow<'_, str> {
        (**self).base_url()
    }

    fn path(&self) -> Cow<'_, str> {
        (**self).path()
    }

    fn method(&self) -> HttpMethod {
        (**self).method()
    }

    fn headers(&self) -> Headers {
        (**self).headers()
    }

    fn parameters(&self) -> Option<RequestParameters> {
        (**self).parameters()
    }
}
