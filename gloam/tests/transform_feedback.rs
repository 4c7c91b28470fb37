mod common;

use gloam::buffer::{Buffer, BufferUsage};
use gloam::driver::headless::Call;
use gloam::environment::Profile;
use gloam::target::BufferTarget;
use gloam::transform_feedback::{CaptureState, TransformFeedbackKind, TransformFeedbackObj};
use gloam::vertex::PrimitiveMode;

use common::context;

#[test]
fn capture_goes_through_its_states() {
  let (ctx, driver) = context(Profile::Core);

  let xfo = TransformFeedbackObj::create(&ctx);
  assert_eq!(xfo.kind(), TransformFeedbackKind::Hardware);

  ctx.bind_transform_feedback(Some(&xfo));
  assert_eq!(driver.state().transform_feedback, xfo.id());

  ctx.begin_transform_feedback(PrimitiveMode::Points);
  assert_eq!(xfo.capture_state(), CaptureState::Recording);

  ctx.pause_transform_feedback();
  assert_eq!(ctx.capture_state(), CaptureState::Paused);

  ctx.resume_transform_feedback();
  ctx.end_transform_feedback();
  assert_eq!(xfo.capture_state(), CaptureState::Idle);

  assert_eq!(
    driver.count(|call| matches!(
      call,
      Call::BeginTransformFeedback(_)
        | Call::PauseTransformFeedback
        | Call::ResumeTransformFeedback
        | Call::EndTransformFeedback
    )),
    4
  );

  ctx.bind_transform_feedback(None);
  assert_eq!(driver.state().transform_feedback, 0);
}

#[test]
fn capture_cycle_keeps_the_indexed_buffers() {
  let (ctx, driver) = context(Profile::Core);

  let xfo = TransformFeedbackObj::create(&ctx);
  let a = Buffer::create(&ctx, BufferTarget::TransformFeedback, 64, None, BufferUsage::StreamCopy);
  let b = Buffer::create(&ctx, BufferTarget::TransformFeedback, 64, None, BufferUsage::StreamCopy);

  ctx.bind_transform_feedback(Some(&xfo));
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 0, &a);
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 1, &b);

  ctx.begin_transform_feedback(PrimitiveMode::Points);
  ctx.pause_transform_feedback();
  ctx.resume_transform_feedback();
  ctx.end_transform_feedback();

  assert_eq!(xfo.buffer_base(0).map(|buffer| buffer.id()), Some(a.id()));
  assert_eq!(xfo.buffer_base(1).map(|buffer| buffer.id()), Some(b.id()));
  assert_eq!(driver.state().indexed_buffer(BufferTarget::TransformFeedback, 0), a.id());
  assert_eq!(driver.state().indexed_buffer(BufferTarget::TransformFeedback, 1), b.id());

  // nothing is bound again by the capture cycle
  assert_eq!(driver.count(|call| matches!(call, Call::BindBufferBase(..))), 2);

  ctx.bind_transform_feedback(None);
}

#[test]
fn capture_without_an_object_uses_the_default_one() {
  let (ctx, _driver) = context(Profile::Compatibility);

  ctx.begin_transform_feedback(PrimitiveMode::Triangles);
  assert_eq!(ctx.capture_state(), CaptureState::Recording);

  ctx.end_transform_feedback();
  assert_eq!(ctx.capture_state(), CaptureState::Idle);
}

#[test]
#[should_panic]
fn beginning_twice_panics() {
  let (ctx, _driver) = context(Profile::Core);

  ctx.begin_transform_feedback(PrimitiveMode::Points);
  ctx.begin_transform_feedback(PrimitiveMode::Points);
}

#[test]
#[should_panic]
fn resuming_an_idle_capture_panics() {
  let (ctx, _driver) = context(Profile::Core);
  ctx.resume_transform_feedback();
}

#[test]
#[should_panic]
fn switching_objects_while_recording_panics() {
  let (ctx, _driver) = context(Profile::Core);

  let xfo = TransformFeedbackObj::create(&ctx);
  ctx.bind_transform_feedback(Some(&xfo));
  ctx.begin_transform_feedback(PrimitiveMode::Lines);
  ctx.bind_transform_feedback(None);
}

#[test]
fn hardware_objects_bind_each_buffer_once_per_bind() {
  let (ctx, driver) = context(Profile::Core);

  let xfo = TransformFeedbackObj::create(&ctx);
  let buffer = Buffer::create(&ctx, BufferTarget::TransformFeedback, 256, None, BufferUsage::StreamCopy);
  let base = Call::BindBufferBase(BufferTarget::TransformFeedback, 0, buffer.id());

  ctx.bind_transform_feedback(Some(&xfo));
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 0, &buffer);
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 0, &buffer);
  assert_eq!(driver.count(|call| *call == base), 1);
  assert_eq!(xfo.buffer_base(0).map(|b| b.id()), Some(buffer.id()));

  // the driver object remembers its bindings; a new bind cycle issues them again on demand
  ctx.bind_transform_feedback(None);
  ctx.bind_transform_feedback(Some(&xfo));
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 0, &buffer);
  assert_eq!(driver.count(|call| *call == base), 2);

  ctx.bind_transform_feedback(None);
}

#[test]
fn software_objects_replay_their_buffers() {
  let (ctx, driver) = context(Profile::Compatibility);

  let xfo = TransformFeedbackObj::create(&ctx);
  assert_eq!(xfo.kind(), TransformFeedbackKind::Software);

  let a = Buffer::create(&ctx, BufferTarget::TransformFeedback, 64, None, BufferUsage::StreamCopy);
  let b = Buffer::create(&ctx, BufferTarget::TransformFeedback, 64, None, BufferUsage::StreamCopy);

  ctx.bind_transform_feedback(Some(&xfo));
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 0, &a);
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 1, &b);
  ctx.bind_buffer_base(BufferTarget::TransformFeedback, 1, &b);
  ctx.bind_transform_feedback(None);

  assert_eq!(driver.count(|call| matches!(call, Call::BindBufferBase(..))), 2);
  assert_eq!(driver.count(|call| matches!(call, Call::BindTransformFeedback(_))), 0);

  driver.clear_calls();
  ctx.bind_transform_feedback(Some(&xfo));

  assert_eq!(
    driver.calls(),
    vec![
      Call::BindBufferBase(BufferTarget::TransformFeedback, 0, a.id()),
      Call::BindBufferBase(BufferTarget::TransformFeedback, 1, b.id()),
    ]
  );

  ctx.bind_transform_feedback(None);
}

#[test]
fn indexed_binds_update_the_generic_binding() {
  let (ctx, driver) = context(Profile::Core);

  let ubo = Buffer::create(&ctx, BufferTarget::Uniform, 64, None, BufferUsage::DynamicDraw);
  ctx.bind_buffer_base(BufferTarget::Uniform, 2, &ubo);

  assert_eq!(ctx.buffer_binding(BufferTarget::Uniform), ubo.id());

  driver.clear_calls();
  ctx.bind_buffer(BufferTarget::Uniform, ubo.id());
  assert!(driver.calls().is_empty());
}
