mod thread_dto;

pub use thread_dto::{
    AttachmentDto, AttachmentUploadDto, DeleteThreadResponseDto, MarkReadResponseDto, MessageDto,
    SendMessageDto, StartCommunityThreadDto, StartPropertyThreadDto, StartedThreadDto,
    ThreadViewDto,
};
