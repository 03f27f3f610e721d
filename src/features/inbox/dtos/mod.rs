mod inbox_dto;

pub use inbox_dto::{
    ConversationDto, CounterpartDto, InboxQuery, InboxResponseDto, InboxScope, LastMessageDto,
    ListingSummaryDto, UnreadCountsDto,
};
