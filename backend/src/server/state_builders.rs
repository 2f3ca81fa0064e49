//! Builders wiring repositories and adapters into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use blog_backend::domain::ports::{
    CommentRepository, GroupRepository, ImageStore, PostRepository, UserRepository,
};
use blog_backend::domain::{PasswordLoginService, PostCommandService, PostListingService};
use blog_backend::inbound::http::state::{HttpState, HttpStatePorts};
use blog_backend::outbound::media::CapStdImageStore;
use blog_backend::outbound::memory::InMemoryBlogStore;
use blog_backend::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselGroupRepository, DieselPostRepository,
    DieselUserRepository,
};
use blog_backend::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Repository set the services are built over.
struct Repositories<P, G, U, C> {
    posts: Arc<P>,
    groups: Arc<G>,
    users: Arc<U>,
    comments: Arc<C>,
}

type DieselRepositories = Repositories<
    DieselPostRepository,
    DieselGroupRepository,
    DieselUserRepository,
    DieselCommentRepository,
>;

impl DieselRepositories {
    fn diesel(pool: &DbPool) -> Self {
        Self {
            posts: Arc::new(DieselPostRepository::new(pool.clone())),
            groups: Arc::new(DieselGroupRepository::new(pool.clone())),
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        }
    }
}

impl Repositories<InMemoryBlogStore, InMemoryBlogStore, InMemoryBlogStore, InMemoryBlogStore> {
    fn in_memory(store: Arc<InMemoryBlogStore>) -> Self {
        Self {
            posts: store.clone(),
            groups: store.clone(),
            users: store.clone(),
            comments: store,
        }
    }
}

fn build_ports<P, G, U, C, I>(repos: Repositories<P, G, U, C>, images: Arc<I>) -> HttpStatePorts
where
    P: PostRepository + 'static,
    G: GroupRepository + 'static,
    U: UserRepository + 'static,
    C: CommentRepository + 'static,
    I: ImageStore + 'static,
{
    let Repositories {
        posts,
        groups,
        users,
        comments,
    } = repos;
    HttpStatePorts {
        listing: Arc::new(PostListingService::new(
            posts.clone(),
            groups.clone(),
            users.clone(),
            comments.clone(),
        )),
        commands: Arc::new(PostCommandService::new(
            posts,
            groups,
            comments,
            images,
            Arc::new(DefaultClock),
        )),
        login: Arc::new(PasswordLoginService::new(users, Arc::new(Argon2PasswordHasher))),
    }
}

/// Build the shared HTTP state, selecting PostgreSQL repositories when a
/// pool is configured and the in-memory store otherwise.
///
/// # Errors
///
/// Propagates the I/O error when the media root cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let images = Arc::new(CapStdImageStore::open(&config.media_root)?);
    let ports = match &config.db_pool {
        Some(pool) => build_ports(Repositories::diesel(pool), images),
        None => {
            info!("no database configured; using the in-memory store");
            build_ports(
                Repositories::in_memory(Arc::new(InMemoryBlogStore::new())),
                images,
            )
        }
    };
    Ok(web::Data::new(HttpState::new(ports)))
}
