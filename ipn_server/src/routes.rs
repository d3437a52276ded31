//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy.
//!
//! Since each worker thread processes its requests sequentially, handlers must never block the current thread. The
//! notification handlers spend almost all their time waiting on the gateway and the store, so they are fully async.
use actix_web::{get, http::header::ContentType, web, HttpResponse, Responder};
use ipn_engine::{
    traits::{StatusFetcher, TransactionStore},
    NotificationFlowApi,
};
use log::*;

use crate::{data_objects::IpnParams, errors::ServerError};

pub const IPN_PATH: &str = "/ipn";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Registers the notification routes for the given backends: `GET /ipn`, `POST /ipn`, and a 405 for every other
/// method on the same path.
pub fn ipn_routes<B, F>(cfg: &mut web::ServiceConfig)
where
    B: TransactionStore + 'static,
    F: StatusFetcher + 'static,
{
    cfg.service(IpnGetRoute::<B, F>::new())
        .service(IpnPostRoute::<B, F>::new())
        .service(web::resource(IPN_PATH).name("ipn_other").to(method_not_allowed));
}

//----------------------------------------------   IPN  ----------------------------------------------------
route!(ipn_get => Get "/ipn" impl TransactionStore, StatusFetcher);
/// Notification delivered as `GET /ipn?url=<status-check URL>`
pub async fn ipn_get<B, F>(
    params: web::Query<IpnParams>,
    api: web::Data<NotificationFlowApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore,
    F: StatusFetcher,
{
    trace!("💻️ Received IPN GET request");
    handle_notification(params.into_inner(), api.get_ref()).await
}

route!(ipn_post => Post "/ipn" impl TransactionStore, StatusFetcher);
/// Notification delivered as `POST /ipn` with a JSON body of `{"url": "<status-check URL>"}`. A body that is not
/// JSON is treated the same as a body without a `url` field.
pub async fn ipn_post<B, F>(
    body: Option<web::Json<IpnParams>>,
    api: web::Data<NotificationFlowApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore,
    F: StatusFetcher,
{
    trace!("💻️ Received IPN POST request");
    let params = body.map(|b| b.into_inner()).unwrap_or_default();
    handle_notification(params, api.get_ref()).await
}

async fn handle_notification<B, F>(params: IpnParams, api: &NotificationFlowApi<B, F>) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore,
    F: StatusFetcher,
{
    api.process_notification(params.url.as_deref()).await?;
    Ok(HttpResponse::Ok().insert_header(ContentType::plaintext()).body("IPN Processed Successfully"))
}

pub async fn method_not_allowed() -> HttpResponse {
    debug!("💻️ Rejecting IPN request with an unsupported method");
    HttpResponse::MethodNotAllowed().insert_header(ContentType::plaintext()).body("Method Not Allowed")
}
