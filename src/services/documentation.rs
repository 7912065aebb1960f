use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the discussion room backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::get_room,
        crate::routes::rooms::start_room,
        crate::routes::rooms::save_conclusion,
        crate::routes::rooms::update_status,
        crate::routes::rooms::add_sorena,
        crate::routes::rooms::record_summary,
        crate::routes::rooms::post_message,
        crate::routes::rooms::get_result,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::participants::add_participant,
        crate::routes::participants::list_participants,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::RoomResponse,
            crate::dto::room::RoomInfo,
            crate::dto::room::StartRoomResponse,
            crate::dto::room::ConclusionRequest,
            crate::dto::room::StatusRequest,
            crate::dto::room::SorenaRequest,
            crate::dto::room::SummaryRequest,
            crate::dto::room::SummaryLogInput,
            crate::dto::room::MessageRequest,
            crate::dto::result::RoomResultResponse,
            crate::dto::result::ResultRoomInfo,
            crate::dto::result::SorenaSummary,
            crate::dto::result::SorenaParticipant,
            crate::dto::result::ChatLogDto,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::UserResponse,
            crate::dto::participant::AddParticipantRequest,
            crate::dto::participant::ParticipantDto,
            crate::dto::participant::ParticipantAdded,
            crate::dto::participant::RoomParticipantsResponse,
            crate::state::lifecycle::RoomStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room lifecycle, agreement taps, and results"),
        (name = "users", description = "User registration"),
        (name = "participants", description = "Room membership"),
    )
)]
pub struct ApiDoc;
